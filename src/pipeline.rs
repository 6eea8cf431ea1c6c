// PunchWatch — Pipeline
//
// Owns every piece of mutable state (filters, window, counters, readiness)
// and drives it from a single cooperative poll loop:
//
//   sample tick:   read IMU -> condition -> publish -> append -> stride gate
//   classify tick: if ready -> flatten window -> classifier -> threshold -> publish
//
// Faults are logged and counted here; none of them is retried.

use crate::acquisition::SensorSource;
use crate::classifier::Classifier;
use crate::conditioner::SignalConditioner;
use crate::config::PipelineConfig;
use crate::decision::DecisionEngine;
use crate::error::{ConfigError, PipelineError};
use crate::events::Decision;
use crate::scheduler::{Cadence, Due, StrideGate};
use crate::telemetry::{format_punch, format_sample, Telemetry, Topic};
use crate::window::SequenceWindow;

/// Running counters, mostly for the serial log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub samples: u64,
    pub acquisition_faults: u64,
    pub windows_classified: u64,
    pub classifier_faults: u64,
    pub decisions_accepted: u64,
    pub decisions_suppressed: u64,
    pub telemetry_faults: u64,
}

pub struct Pipeline<S, C, T> {
    config: PipelineConfig,
    source: S,
    telemetry: T,
    conditioner: SignalConditioner,
    window: SequenceWindow,
    gate: StrideGate,
    cadence: Cadence,
    engine: DecisionEngine<C>,
    raw: Vec<f32>,
    conditioned: Vec<f32>,
    payload: String,
    stats: PipelineStats,
}

impl<S, C, T> Pipeline<S, C, T>
where
    S: SensorSource,
    C: Classifier,
    T: Telemetry,
{
    /// Build the pipeline, rejecting any configuration the classifier cannot consume.
    ///
    /// Both cadences count their first period from `start_ms`.
    pub fn new(
        config: PipelineConfig,
        source: S,
        classifier: C,
        telemetry: T,
        start_ms: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        if classifier.input_len() != config.input_len() {
            return Err(ConfigError::InputMismatch {
                classifier: classifier.input_len(),
                seq_length: config.seq_length,
                n_features: config.n_features,
            });
        }
        if classifier.output_len() != config.labels.len() {
            return Err(ConfigError::OutputMismatch {
                classifier: classifier.output_len(),
                labels: config.labels.len(),
            });
        }

        let engine = DecisionEngine::new(
            classifier,
            config.labels.clone(),
            config.confidence_threshold,
        );

        Ok(Self {
            conditioner: SignalConditioner::new(config.filter_window, &config.bias),
            window: SequenceWindow::new(config.seq_length, config.n_features),
            gate: StrideGate::new(config.stride, config.seq_length),
            cadence: Cadence::new(config.sample_interval_ms, config.classify_interval_ms, start_ms),
            raw: vec![0.0; config.n_features],
            conditioned: vec![0.0; config.n_features],
            payload: String::with_capacity(8 * config.n_features),
            stats: PipelineStats::default(),
            engine,
            source,
            telemetry,
            config,
        })
    }

    /// Run whichever cadences are due at `now_ms`. Sampling goes first.
    pub fn poll(&mut self, now_ms: u64) -> Due {
        let due = self.cadence.poll(now_ms);
        // Faults are already logged and counted by the tick bodies.
        if due.sample {
            let _ = self.sample_tick();
        }
        if due.classify {
            let _ = self.classify_tick();
        }
        due
    }

    /// Sampling task body.
    pub fn sample_tick(&mut self) -> Result<(), PipelineError> {
        if let Err(e) = self.source.read(&mut self.raw) {
            self.stats.acquisition_faults += 1;
            log::warn!("IMU read error: {}", e);
            return Err(e.into());
        }

        self.conditioner.condition_all(&self.raw, &mut self.conditioned);

        format_sample(&mut self.payload, &self.conditioned);
        log::trace!("{}", self.payload);
        if let Err(e) = self.telemetry.publish(Topic::SensorData, &self.payload) {
            self.stats.telemetry_faults += 1;
            log::warn!("Sample report dropped: {}", e);
        }

        self.window.append(&self.conditioned);
        self.stats.samples += 1;

        if self.gate.record_sample() {
            log::trace!("Window ready after {} samples", self.gate.total_samples());
        }
        Ok(())
    }

    /// Classification task body. Returns the decision that was published, if any.
    pub fn classify_tick(&mut self) -> Result<Option<Decision>, PipelineError> {
        if !self.gate.take() {
            return Ok(None);
        }
        let Some(snapshot) = self.window.snapshot() else {
            return Ok(None);
        };

        self.stats.windows_classified += 1;
        let decision = match self.engine.decide(&snapshot) {
            Ok(Some(decision)) => decision,
            Ok(None) => {
                self.stats.decisions_suppressed += 1;
                return Ok(None);
            }
            Err(e) => {
                self.stats.classifier_faults += 1;
                log::error!("Model invocation failed: {}", e);
                return Err(e.into());
            }
        };

        self.stats.decisions_accepted += 1;
        let payload = format_punch(&decision, self.config.side);
        if let Err(e) = self.telemetry.publish(Topic::Punch, &payload) {
            self.stats.telemetry_faults += 1;
            log::warn!("Punch report dropped: {}", e);
        }
        Ok(Some(decision))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn window(&self) -> &SequenceWindow {
        &self.window
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
