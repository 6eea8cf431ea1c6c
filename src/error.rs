// PunchWatch — Fault Taxonomy
//
// Every fault the pipeline can observe is reported through `log` and counted
// in `PipelineStats`. Only configuration faults are fatal.

use thiserror::Error;

/// The sensor could not produce a reading for this tick.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("sensor bus error: {0}")]
    Bus(String),

    #[error("sensor produced {actual} channels, expected {expected}")]
    ChannelCount { expected: usize, actual: usize },
}

/// The classifier failed to run on a window.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("inference backend returned status {0}")]
    Backend(i32),

    #[error("classifier expected {expected} inputs, got {actual}")]
    InputShape { expected: usize, actual: usize },
}

/// A report could not be handed to the transport.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("transport not connected")]
    NotConnected,

    #[error("publish to {topic} failed: {reason}")]
    Publish { topic: &'static str, reason: String },
}

/// Startup-time shape or value problems. Fatal.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be non-zero")]
    Zero(&'static str),

    #[error("bias vector has {actual} entries, expected {expected}")]
    BiasLength { expected: usize, actual: usize },

    #[error("confidence threshold {0} outside [0, 1]")]
    Threshold(f32),

    #[error("classifier takes {classifier} inputs but window is {seq_length}x{n_features}")]
    InputMismatch {
        classifier: usize,
        seq_length: usize,
        n_features: usize,
    },

    #[error("classifier produces {classifier} outputs but {labels} labels are configured")]
    OutputMismatch { classifier: usize, labels: usize },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("acquisition fault: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("classifier fault: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("telemetry fault: {0}")]
    Telemetry(#[from] TelemetryError),

    #[error("configuration fault: {0}")]
    Config(#[from] ConfigError),
}
