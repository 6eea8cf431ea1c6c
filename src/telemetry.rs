// PunchWatch — Telemetry Channel
//
// What the pipeline publishes and how the payloads are laid out. Delivery is
// the transport's business.

use std::fmt::Write as _;

use crate::config::{TOPIC_PUNCH, TOPIC_SENSOR_DATA};
use crate::error::TelemetryError;
use crate::events::{Decision, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// One conditioned sample per sampling tick.
    SensorData,
    /// One accepted punch decision.
    Punch,
}

impl Topic {
    pub fn path(&self) -> &'static str {
        match self {
            Self::SensorData => TOPIC_SENSOR_DATA,
            Self::Punch => TOPIC_PUNCH,
        }
    }
}

pub trait Telemetry {
    fn publish(&mut self, topic: Topic, payload: &str) -> Result<(), TelemetryError>;
}

/// `"1.073,-0.041,9.970,..."`: three decimals, comma-joined, no spaces.
pub fn format_sample(out: &mut String, sample: &[f32]) {
    out.clear();
    for (i, value) in sample.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let _ = write!(out, "{:.3}", value);
    }
}

/// `"JAB, Left"`.
pub fn format_punch(decision: &Decision, side: Side) -> String {
    format!("{}, {}", decision.label, side.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_payload_has_three_decimals() {
        let mut out = String::from("stale");
        format_sample(&mut out, &[1.073, -0.041, 9.97, 0.0, 12.3456, -2.5]);
        assert_eq!(out, "1.073,-0.041,9.970,0.000,12.346,-2.500");
    }

    #[test]
    fn punch_payload_names_label_and_side() {
        let decision = Decision {
            index: 1,
            label: "JAB",
            confidence: 0.75,
        };
        assert_eq!(format_punch(&decision, Side::Left), "JAB, Left");
        assert_eq!(format_punch(&decision, Side::Right), "JAB, Right");
    }

    #[test]
    fn topics_map_to_broker_paths() {
        assert_eq!(Topic::SensorData.path(), "boxing/raw_data_left");
        assert_eq!(Topic::Punch.path(), "boxing/punch_type");
    }
}
