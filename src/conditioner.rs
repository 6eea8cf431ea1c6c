// PunchWatch — Signal Conditioner
//
// Trailing moving average per channel followed by a fixed additive bias.
// During warm-up the mean only covers the readings seen so far, so the
// zero-initialised slots never drag the output toward zero.

/// Ring buffer holding the last `W` raw readings of one channel.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    buffer: Vec<f32>,
    cursor: usize,
    filled: bool,
}

impl MovingAverage {
    /// `window` must be non-zero; `PipelineConfig::validate` enforces it.
    pub fn new(window: usize) -> Self {
        Self {
            buffer: vec![0.0; window],
            cursor: 0,
            filled: false,
        }
    }

    /// Record `value` and return the mean of the most recent `min(seen, W)` readings.
    pub fn push(&mut self, value: f32) -> f32 {
        let window = self.buffer.len();
        self.buffer[self.cursor] = value;

        let count = if self.filled { window } else { self.cursor + 1 };
        let sum: f32 = self.buffer[..count].iter().sum();

        self.cursor = (self.cursor + 1) % window;
        if !self.filled && self.cursor == 0 {
            self.filled = true;
        }

        sum / count as f32
    }

    pub fn is_filled(&self) -> bool {
        self.filled
    }
}

/// One [`MovingAverage`] plus one bias constant per channel.
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    filters: Vec<MovingAverage>,
    bias: Vec<f32>,
}

impl SignalConditioner {
    /// One filter of depth `window` is created per bias entry.
    pub fn new(window: usize, bias: &[f32]) -> Self {
        Self {
            filters: bias.iter().map(|_| MovingAverage::new(window)).collect(),
            bias: bias.to_vec(),
        }
    }

    pub fn channels(&self) -> usize {
        self.filters.len()
    }

    /// Smooth `raw` on `channel` and apply that channel's bias.
    ///
    /// Panics if `channel` is out of range.
    pub fn condition(&mut self, channel: usize, raw: f32) -> f32 {
        self.filters[channel].push(raw) + self.bias[channel]
    }

    /// Condition a whole reading. `raw` and `out` must both be `channels()` long.
    pub fn condition_all(&mut self, raw: &[f32], out: &mut [f32]) {
        debug_assert_eq!(raw.len(), self.channels());
        debug_assert_eq!(out.len(), self.channels());
        for (channel, (value, slot)) in raw.iter().zip(out.iter_mut()).enumerate() {
            *slot = self.condition(channel, *value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn warm_up_averages_only_seen_values() {
        let mut conditioner = SignalConditioner::new(5, &[0.0]);
        let outputs: Vec<f32> = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
            .iter()
            .map(|&v| conditioner.condition(0, v))
            .collect();
        let expected = [1.0, 1.5, 2.0, 2.5, 3.0, 4.0];
        for (got, want) in outputs.iter().zip(expected.iter()) {
            assert!(close(*got, *want), "got {got}, want {want}");
        }
    }

    #[test]
    fn long_runs_average_the_last_window() {
        let mut filter = MovingAverage::new(3);
        let mut last = 0.0;
        for v in 1..=10 {
            last = filter.push(v as f32);
        }
        assert!(filter.is_filled());
        assert!(close(last, 9.0)); // mean of 8, 9, 10
    }

    #[test]
    fn filled_flag_set_on_first_wrap() {
        let mut filter = MovingAverage::new(2);
        filter.push(1.0);
        assert!(!filter.is_filled());
        filter.push(1.0);
        assert!(filter.is_filled());
    }

    #[test]
    fn bias_is_added_after_filtering() {
        let mut conditioner = SignalConditioner::new(4, &[1.073, -0.5]);
        assert!(close(conditioner.condition(0, 2.0), 3.073));
        assert!(close(conditioner.condition(0, 4.0), 4.073));
        assert!(close(conditioner.condition(1, 10.0), 9.5));
    }

    #[test]
    fn channels_keep_independent_history() {
        let mut conditioner = SignalConditioner::new(5, &[0.0, 0.0]);
        conditioner.condition(0, 100.0);
        conditioner.condition(0, 100.0);
        // channel 1 has seen nothing yet, so its first output is its own raw value
        assert!(close(conditioner.condition(1, 2.0), 2.0));
    }

    #[test]
    fn condition_all_maps_each_channel() {
        let mut conditioner = SignalConditioner::new(5, &[1.0, 2.0, 3.0]);
        let mut out = [0.0; 3];
        conditioner.condition_all(&[10.0, 20.0, 30.0], &mut out);
        assert_eq!(out, [11.0, 22.0, 33.0]);
    }
}
