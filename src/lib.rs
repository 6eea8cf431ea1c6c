// PunchWatch — Punch Classification Core
//
// Everything between the IMU and the MQTT broker that does not touch
// hardware: signal conditioning, the sequence window, the two cadences and
// the confidence policy. Builds and tests on the host; the firmware binary
// plugs the ESP-IDF drivers into the traits defined here.

pub mod acquisition;
pub mod classifier;
pub mod conditioner;
pub mod config;
pub mod decision;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod scheduler;
pub mod telemetry;
pub mod window;

pub use acquisition::SensorSource;
pub use classifier::{Classifier, StubClassifier};
pub use config::PipelineConfig;
pub use error::{AcquisitionError, ClassifierError, ConfigError, PipelineError, TelemetryError};
pub use events::{Decision, SensorData, Side};
pub use pipeline::{Pipeline, PipelineStats};
pub use scheduler::Clock;
pub use telemetry::{Telemetry, Topic};
