// PunchWatch — Hardware & System Configuration
// Target: ESP32 DevKit (Xtensa) + MPU6050 strapped to the left glove

use crate::error::ConfigError;
use crate::events::Side;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_I2C_SDA: i32 = 21;
pub const PIN_I2C_SCL: i32 = 22;

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_BAUDRATE_KHZ: u32 = 400;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_PIPELINE: usize = 16 * 1024; // inference runs on this stack
pub const STACK_MQTT: usize = 4096;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const SAMPLE_INTERVAL_MS: u64 = 50;         // 20 Hz sensor cadence
pub const CLASSIFY_INTERVAL_MS: u64 = 150;      // punch decision cadence
pub const PIPELINE_POLL_MS: u64 = 5;            // cooperative scheduler poll
pub const MQTT_MAINTENANCE_MS: u64 = 500;       // re-subscribe check
pub const WIFI_RETRY_MS: u64 = 500;

// ---------------------------------------------------------------------------
// Signal Conditioning
// ---------------------------------------------------------------------------
pub const FILTER_WINDOW: usize = 5;

/// Additive bias per channel (left glove IMU), in [ax, ay, az, gx, gy, gz] order.
pub const IMU_BIAS: [f32; N_FEATURES] = [1.073, -0.041, 0.164, -0.107, -0.015, -0.020];

// ---------------------------------------------------------------------------
// Punch Model
// ---------------------------------------------------------------------------
pub const SEQ_LENGTH: usize = 12;
pub const N_FEATURES: usize = 6;
pub const N_INPUTS: usize = SEQ_LENGTH * N_FEATURES; // 72
pub const STRIDE: u32 = 1;                          // classify on every new sample
pub const N_OUTPUTS: usize = 3;
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Labels in model output order.
pub const PUNCH_LABELS: [&str; N_OUTPUTS] = ["HOOK", "JAB", "NO PUNCH"];

/// Which glove this unit is sewn into.
pub const GLOVE_SIDE: Side = Side::Left;

// ---------------------------------------------------------------------------
// Network (credentials are baked in at build time)
// ---------------------------------------------------------------------------
pub const WIFI_SSID: &str = match option_env!("PUNCHWATCH_WIFI_SSID") {
    Some(v) => v,
    None => "",
};
pub const WIFI_PASSWORD: &str = match option_env!("PUNCHWATCH_WIFI_PASS") {
    Some(v) => v,
    None => "",
};
pub const MQTT_BROKER_URL: &str = match option_env!("PUNCHWATCH_MQTT_URL") {
    Some(v) => v,
    None => "mqtts://broker.hivemq.com:8883",
};
pub const MQTT_USERNAME: &str = match option_env!("PUNCHWATCH_MQTT_USER") {
    Some(v) => v,
    None => "",
};
pub const MQTT_PASSWORD: &str = match option_env!("PUNCHWATCH_MQTT_PASS") {
    Some(v) => v,
    None => "",
};
pub const MQTT_CLIENT_ID_PREFIX: &str = "ESP32-MPU6050-";

pub const TOPIC_SENSOR_DATA: &str = "boxing/raw_data_left";
pub const TOPIC_PUNCH: &str = "boxing/punch_type";
pub const TOPIC_CONTROL: &str = "boxing/control";

// ---------------------------------------------------------------------------
// MPU6050 Sensor Scale Factors
// ---------------------------------------------------------------------------
pub const ACCEL_SCALE_8G: f32 = 4096.0;   // LSB/g  at ±8 g
pub const GYRO_SCALE_500: f32 = 65.5;     // LSB/°/s at ±500 °/s
pub const STANDARD_GRAVITY: f32 = 9.806_65;

// ---------------------------------------------------------------------------
// Runtime pipeline configuration
// ---------------------------------------------------------------------------

/// Dimensions, cadences and decision policy of one pipeline instance.
///
/// The firmware uses [`PipelineConfig::default`], which is assembled from the
/// constants above. Tests build smaller shapes directly.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Samples per classifier window (`L`).
    pub seq_length: usize,
    /// Channels per sample (`F`).
    pub n_features: usize,
    /// New samples between classification attempts.
    pub stride: u32,
    /// Moving-average depth (`W`).
    pub filter_window: usize,
    pub sample_interval_ms: u64,
    pub classify_interval_ms: u64,
    /// One additive offset per channel.
    pub bias: Vec<f32>,
    /// Winning probability must be strictly above this to publish.
    pub confidence_threshold: f32,
    /// Labels in classifier output order.
    pub labels: Vec<&'static str>,
    pub side: Side,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seq_length: SEQ_LENGTH,
            n_features: N_FEATURES,
            stride: STRIDE,
            filter_window: FILTER_WINDOW,
            sample_interval_ms: SAMPLE_INTERVAL_MS,
            classify_interval_ms: CLASSIFY_INTERVAL_MS,
            bias: IMU_BIAS.to_vec(),
            confidence_threshold: CONFIDENCE_THRESHOLD,
            labels: PUNCH_LABELS.to_vec(),
            side: GLOVE_SIDE,
        }
    }
}

impl PipelineConfig {
    /// Flattened classifier input length (`L × F`).
    pub fn input_len(&self) -> usize {
        self.seq_length * self.n_features
    }

    /// Reject shapes the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seq_length == 0 {
            return Err(ConfigError::Zero("seq_length"));
        }
        if self.n_features == 0 {
            return Err(ConfigError::Zero("n_features"));
        }
        if self.stride == 0 {
            return Err(ConfigError::Zero("stride"));
        }
        if self.filter_window == 0 {
            return Err(ConfigError::Zero("filter_window"));
        }
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::Zero("sample_interval_ms"));
        }
        if self.classify_interval_ms == 0 {
            return Err(ConfigError::Zero("classify_interval_ms"));
        }
        if self.bias.len() != self.n_features {
            return Err(ConfigError::BiasLength {
                expected: self.n_features,
                actual: self.bias.len(),
            });
        }
        if self.labels.is_empty() {
            return Err(ConfigError::Zero("labels"));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Threshold(self.confidence_threshold));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.input_len(), N_INPUTS);
        assert_eq!(config.labels.len(), N_OUTPUTS);
    }

    #[test]
    fn zero_stride_is_rejected() {
        let config = PipelineConfig {
            stride: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Zero("stride")));
    }

    #[test]
    fn bias_must_cover_every_channel() {
        let config = PipelineConfig {
            bias: vec![0.0; 3],
            ..PipelineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BiasLength {
                expected: 6,
                actual: 3
            })
        );
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        let config = PipelineConfig {
            confidence_threshold: 1.5,
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Threshold(1.5)));
    }
}
