// PunchWatch — Data Types shared by the pipeline and the firmware

use crate::config::N_FEATURES;

// ---------------------------------------------------------------------------
// Sensor Data (6-axis IMU reading from MPU6050)
// ---------------------------------------------------------------------------
/// Acceleration in m/s², rotation rate in rad/s.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorData {
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    pub gx: f32,
    pub gy: f32,
    pub gz: f32,
}

impl SensorData {
    /// Channel order used by the filters and the model.
    pub fn to_channels(&self) -> [f32; N_FEATURES] {
        [self.ax, self.ay, self.az, self.gx, self.gy, self.gz]
    }

    pub fn accel_magnitude(&self) -> f32 {
        (self.ax * self.ax + self.ay * self.ay + self.az * self.az).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Glove side
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------
/// A classifier output that cleared the confidence threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Position in the label enumeration.
    pub index: usize,
    pub label: &'static str,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_follow_accel_then_gyro_order() {
        let data = SensorData {
            ax: 1.0,
            ay: 2.0,
            az: 3.0,
            gx: 4.0,
            gy: 5.0,
            gz: 6.0,
        };
        assert_eq!(data.to_channels(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn magnitude_ignores_gyro() {
        let data = SensorData {
            ax: 3.0,
            ay: 4.0,
            gz: 100.0,
            ..SensorData::default()
        };
        assert!((data.accel_magnitude() - 5.0).abs() < 1e-6);
    }
}
