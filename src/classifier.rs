// PunchWatch — Punch Classifier Interface
//
// The trained model is opaque to the pipeline: a flat `L × F` window goes in,
// one probability per label comes out.
//
// Back-ends:
//   1. STUB (default): a magnitude heuristic so the rest of the firmware can
//      be developed and tested without the C++ inference SDK compiled in.
//   2. FFI: enable the `edge-impulse` feature; build.rs compiles the SDK and
//      `EiClassifier` links against its `run_classifier` entry point.

use crate::error::ClassifierError;
use crate::events::SensorData;

/// Capability interface over the inference engine.
pub trait Classifier {
    /// Flattened input size the model was trained on.
    fn input_len(&self) -> usize;

    /// Number of probabilities written per call.
    fn output_len(&self) -> usize;

    /// Run the model. `input` is `input_len()` long, `output` is `output_len()` long.
    fn infer(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), ClassifierError>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn input_len(&self) -> usize {
        (**self).input_len()
    }

    fn output_len(&self) -> usize {
        (**self).output_len()
    }

    fn infer(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), ClassifierError> {
        (**self).infer(input, output)
    }
}

// ---------------------------------------------------------------------------
// Stub back-end — development / testing without the C++ SDK
// ---------------------------------------------------------------------------

/// Acceleration magnitude (m/s²) above which the stub reports a punch.
pub const STUB_PUNCH_MAGNITUDE: f32 = 17.0;

/// Heuristic stand-in for the trained model.
///
/// Looks at the newest row of the window: when its acceleration magnitude is
/// above [`STUB_PUNCH_MAGNITUDE`] the stub cycles through the punch labels
/// (every label but the last); otherwise it votes for the last label, which
/// is the "no punch" class. Needs at least three channels (ax, ay, az first).
#[derive(Debug, Clone)]
pub struct StubClassifier {
    seq_length: usize,
    n_features: usize,
    n_labels: usize,
    next_punch: usize,
}

impl StubClassifier {
    pub fn new(seq_length: usize, n_features: usize, n_labels: usize) -> Self {
        Self {
            seq_length,
            n_features,
            n_labels,
            next_punch: 0,
        }
    }
}

impl Classifier for StubClassifier {
    fn input_len(&self) -> usize {
        self.seq_length * self.n_features
    }

    fn output_len(&self) -> usize {
        self.n_labels
    }

    fn infer(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), ClassifierError> {
        if input.len() != self.input_len() || self.n_features < 3 {
            return Err(ClassifierError::InputShape {
                expected: self.input_len(),
                actual: input.len(),
            });
        }

        let newest = &input[input.len() - self.n_features..];
        let magnitude = SensorData {
            ax: newest[0],
            ay: newest[1],
            az: newest[2],
            ..SensorData::default()
        }
        .accel_magnitude();

        let idle = self.n_labels.saturating_sub(1);
        let winner = if magnitude > STUB_PUNCH_MAGNITUDE && idle > 0 {
            let punch = self.next_punch;
            self.next_punch = (self.next_punch + 1) % idle;
            punch
        } else {
            idle
        };

        let rest = 0.2 / self.n_labels.saturating_sub(1).max(1) as f32;
        for (i, p) in output.iter_mut().enumerate() {
            *p = if i == winner { 0.8 } else { rest };
        }

        log::debug!("STUB inference — |a| = {:.2}, winner = {}", magnitude, winner);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Real FFI back-end — calls the C++ Edge Impulse compiled library
// ---------------------------------------------------------------------------
#[cfg(feature = "edge-impulse")]
mod ffi {
    use std::ffi::c_char;

    use crate::config::N_OUTPUTS;

    #[repr(C)]
    pub struct EiSignal {
        pub get_data: Option<unsafe extern "C" fn(usize, usize, *mut f32) -> i32>,
        pub total_length: usize,
    }

    #[repr(C)]
    pub struct EiClassification {
        pub label: *const c_char,
        pub value: f32,
    }

    // The full struct has more fields; we only access `classification`.
    #[repr(C)]
    pub struct EiImpulseResult {
        pub classification: [EiClassification; N_OUTPUTS],
        pub anomaly: f32,
    }

    extern "C" {
        pub fn run_classifier(
            signal: *mut EiSignal,
            result: *mut EiImpulseResult,
            debug: bool,
        ) -> i32;
    }
}

/// Classifier backed by the compiled inference SDK.
///
/// Only one instance may run inference at a time; the pipeline thread is the
/// sole owner.
#[cfg(feature = "edge-impulse")]
#[derive(Debug, Default)]
pub struct EiClassifier;

#[cfg(feature = "edge-impulse")]
mod signal {
    use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

    pub static BUF: AtomicPtr<f32> = AtomicPtr::new(std::ptr::null_mut());
    pub static LEN: AtomicUsize = AtomicUsize::new(0);

    /// SDK callback: copy `length` values starting at `offset` into `out`.
    pub unsafe extern "C" fn get_data(offset: usize, length: usize, out: *mut f32) -> i32 {
        let buf = BUF.load(Ordering::Acquire);
        if buf.is_null() || offset + length > LEN.load(Ordering::Acquire) {
            return -1;
        }
        unsafe { core::ptr::copy_nonoverlapping(buf.add(offset), out, length) };
        0
    }
}

#[cfg(feature = "edge-impulse")]
impl Classifier for EiClassifier {
    fn input_len(&self) -> usize {
        crate::config::N_INPUTS
    }

    fn output_len(&self) -> usize {
        crate::config::N_OUTPUTS
    }

    fn infer(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), ClassifierError> {
        use std::ffi::CStr;
        use std::sync::atomic::Ordering;

        if input.len() != self.input_len() {
            return Err(ClassifierError::InputShape {
                expected: self.input_len(),
                actual: input.len(),
            });
        }

        // The SDK only reads through the pointer while `run_classifier` runs.
        signal::BUF.store(input.as_ptr() as *mut f32, Ordering::Release);
        signal::LEN.store(input.len(), Ordering::Release);

        let mut sig = ffi::EiSignal {
            get_data: Some(signal::get_data),
            total_length: input.len(),
        };

        // SAFETY: `result` is plain C data; the SDK fills every field we read.
        let status = unsafe {
            let mut result: ffi::EiImpulseResult = core::mem::zeroed();
            let err = ffi::run_classifier(&mut sig, &mut result, false);
            if err == 0 {
                for (i, slot) in output.iter_mut().enumerate().take(crate::config::N_OUTPUTS) {
                    *slot = result.classification[i].value;
                    let label = CStr::from_ptr(result.classification[i].label);
                    log::debug!("{}: {:.4}", label.to_str().unwrap_or("?"), *slot);
                }
            }
            err
        };

        signal::BUF.store(std::ptr::null_mut(), Ordering::Release);
        signal::LEN.store(0, Ordering::Release);

        if status != 0 {
            return Err(ClassifierError::Backend(status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_with_newest(ax: f32) -> Vec<f32> {
        let mut input = vec![0.0; 2 * 6];
        input[6] = ax;
        input
    }

    #[test]
    fn quiet_window_votes_no_punch() {
        let mut stub = StubClassifier::new(2, 6, 3);
        let mut out = [0.0; 3];
        stub.infer(&window_with_newest(9.8), &mut out).unwrap();
        assert_eq!(out, [0.1, 0.1, 0.8]);
    }

    #[test]
    fn hard_hits_cycle_through_punch_labels() {
        let mut stub = StubClassifier::new(2, 6, 3);
        let mut out = [0.0; 3];

        stub.infer(&window_with_newest(25.0), &mut out).unwrap();
        assert_eq!(out, [0.8, 0.1, 0.1]);
        stub.infer(&window_with_newest(25.0), &mut out).unwrap();
        assert_eq!(out, [0.1, 0.8, 0.1]);
        stub.infer(&window_with_newest(25.0), &mut out).unwrap();
        assert_eq!(out, [0.8, 0.1, 0.1]);
    }

    #[test]
    fn wrong_input_length_is_a_fault() {
        let mut stub = StubClassifier::new(12, 6, 3);
        let mut out = [0.0; 3];
        let err = stub.infer(&[0.0; 10], &mut out).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::InputShape {
                expected: 72,
                actual: 10
            }
        ));
    }

    #[test]
    fn boxed_classifier_delegates() {
        let mut boxed: Box<dyn Classifier> = Box::new(StubClassifier::new(12, 6, 3));
        assert_eq!(boxed.input_len(), 72);
        assert_eq!(boxed.output_len(), 3);
        let mut out = [0.0; 3];
        assert!(boxed.infer(&[0.0; 72], &mut out).is_ok());
    }
}
