// PunchWatch — Decision Engine
//
// Runs the classifier on a ready window, picks the most probable label and
// only lets it through when the probability clears the confidence threshold.

use crate::classifier::Classifier;
use crate::error::ClassifierError;
use crate::events::Decision;
use crate::window::WindowSnapshot;

/// Index and value of the largest probability. Ties go to the lowest index.
pub fn argmax(probabilities: &[f32]) -> Option<(usize, f32)> {
    let mut iter = probabilities.iter().copied().enumerate();
    let mut best = iter.next()?;
    for (i, p) in iter {
        if p > best.1 {
            best = (i, p);
        }
    }
    Some(best)
}

/// Outcome of one classification pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Confident enough to publish.
    Accepted(Decision),
    /// Winner did not clear the threshold.
    Suppressed(Decision),
}

pub struct DecisionEngine<C> {
    classifier: C,
    labels: Vec<&'static str>,
    threshold: f32,
    input: Vec<f32>,
    output: Vec<f32>,
}

impl<C: Classifier> DecisionEngine<C> {
    /// Buffers are sized from the classifier; the caller checks they match the window.
    pub fn new(classifier: C, labels: Vec<&'static str>, threshold: f32) -> Self {
        let input = vec![0.0; classifier.input_len()];
        let output = vec![0.0; classifier.output_len()];
        Self {
            classifier,
            labels,
            threshold,
            input,
            output,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Apply the argmax + threshold policy to a probability vector.
    pub fn judge(&self, probabilities: &[f32]) -> Option<Verdict> {
        let (index, confidence) = argmax(probabilities)?;
        let label = *self.labels.get(index)?;
        let decision = Decision {
            index,
            label,
            confidence,
        };

        if confidence > self.threshold {
            Some(Verdict::Accepted(decision))
        } else {
            Some(Verdict::Suppressed(decision))
        }
    }

    /// Classify `snapshot`. `Ok(None)` means the prediction was suppressed.
    pub fn decide(&mut self, snapshot: &WindowSnapshot<'_>) -> Result<Option<Decision>, ClassifierError> {
        if snapshot.flat_len() != self.input.len() {
            return Err(ClassifierError::InputShape {
                expected: self.input.len(),
                actual: snapshot.flat_len(),
            });
        }
        snapshot.flatten_into(&mut self.input);
        self.classifier.infer(&self.input, &mut self.output)?;

        match self.judge(&self.output) {
            Some(Verdict::Accepted(decision)) => {
                log::info!("PUNCH: {} ({:.1}%)", decision.label, decision.confidence * 100.0);
                Ok(Some(decision))
            }
            Some(Verdict::Suppressed(decision)) => {
                log::info!(
                    "PUNCH: {} ({:.1}%) below threshold",
                    decision.label,
                    decision.confidence * 100.0
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::SequenceWindow;

    /// Returns a fixed probability vector, or fails when `status` is set.
    struct Fixed {
        probs: Vec<f32>,
        input_len: usize,
        status: Option<i32>,
        seen: Vec<f32>,
    }

    impl Classifier for Fixed {
        fn input_len(&self) -> usize {
            self.input_len
        }

        fn output_len(&self) -> usize {
            self.probs.len()
        }

        fn infer(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), ClassifierError> {
            self.seen = input.to_vec();
            if let Some(status) = self.status {
                return Err(ClassifierError::Backend(status));
            }
            output.copy_from_slice(&self.probs);
            Ok(())
        }
    }

    fn engine(probs: &[f32]) -> DecisionEngine<Fixed> {
        let classifier = Fixed {
            probs: probs.to_vec(),
            input_len: 2,
            status: None,
            seen: Vec::new(),
        };
        DecisionEngine::new(classifier, vec!["HOOK", "JAB", "NO PUNCH"], 0.5)
    }

    fn full_window() -> SequenceWindow {
        let mut window = SequenceWindow::new(2, 1);
        window.append(&[1.0]);
        window.append(&[2.0]);
        window
    }

    #[test]
    fn argmax_prefers_first_of_equal_maxima() {
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), Some((0, 0.4)));
        assert_eq!(argmax(&[0.1, 0.45, 0.45]), Some((1, 0.45)));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn tie_break_is_deterministic() {
        let engine = engine(&[0.4, 0.4, 0.2]);
        for _ in 0..10 {
            let verdict = engine.judge(&[0.4, 0.4, 0.2]);
            assert!(matches!(verdict, Some(Verdict::Suppressed(Decision { index: 0, .. }))));
        }
    }

    #[test]
    fn confident_winner_is_emitted() {
        let mut engine = engine(&[0.2, 0.75, 0.05]);
        let window = full_window();
        let decision = engine.decide(&window.snapshot().unwrap()).unwrap();
        assert_eq!(
            decision,
            Some(Decision {
                index: 1,
                label: "JAB",
                confidence: 0.75
            })
        );
    }

    #[test]
    fn winner_at_threshold_is_suppressed() {
        let mut engine = engine(&[0.5, 0.3, 0.2]);
        let window = full_window();
        assert_eq!(engine.decide(&window.snapshot().unwrap()).unwrap(), None);
    }

    #[test]
    fn suppression_holds_for_any_low_vector() {
        let engine = engine(&[0.0; 3]);
        let vectors = [[0.34, 0.33, 0.33], [0.1, 0.2, 0.5], [0.0, 0.0, 0.0], [0.45, 0.05, 0.5]];
        for probs in vectors {
            assert!(
                matches!(engine.judge(&probs), Some(Verdict::Suppressed(_))),
                "{probs:?} should be suppressed"
            );
        }
    }

    #[test]
    fn classifier_sees_flattened_window() {
        let mut engine = engine(&[0.9, 0.05, 0.05]);
        let window = full_window();
        engine.decide(&window.snapshot().unwrap()).unwrap();
        assert_eq!(engine.classifier().seen, vec![1.0, 2.0]);
    }

    #[test]
    fn classifier_failure_is_reported() {
        let mut engine = engine(&[0.9, 0.05, 0.05]);
        engine.classifier.status = Some(-3);
        let window = full_window();
        let err = engine.decide(&window.snapshot().unwrap()).unwrap_err();
        assert!(matches!(err, ClassifierError::Backend(-3)));
    }
}
