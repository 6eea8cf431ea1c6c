// PunchWatch — Cadence Scheduler
//
// Two independent periodic timers (sampling, classification) read from one
// monotonic clock, plus the stride gate that decides when a full window is
// worth classifying. Nothing here blocks; the caller polls.

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// A task that should run once every `period_ms`.
#[derive(Debug, Clone)]
pub struct Periodic {
    period_ms: u64,
    last_run_ms: u64,
}

impl Periodic {
    /// The first run is due one full period after `start_ms`.
    pub fn new(period_ms: u64, start_ms: u64) -> Self {
        Self {
            period_ms,
            last_run_ms: start_ms,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// If at least one period has elapsed, restart the period at `now_ms` and return `true`.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_run_ms) >= self.period_ms {
            self.last_run_ms = now_ms;
            true
        } else {
            false
        }
    }
}

/// Which cadences fired during one scheduler poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Due {
    pub sample: bool,
    pub classify: bool,
}

#[derive(Debug, Clone)]
pub struct Cadence {
    sample: Periodic,
    classify: Periodic,
}

impl Cadence {
    pub fn new(sample_interval_ms: u64, classify_interval_ms: u64, start_ms: u64) -> Self {
        Self {
            sample: Periodic::new(sample_interval_ms, start_ms),
            classify: Periodic::new(classify_interval_ms, start_ms),
        }
    }

    /// Check both timers independently.
    pub fn poll(&mut self, now_ms: u64) -> Due {
        Due {
            sample: self.sample.poll(now_ms),
            classify: self.classify.poll(now_ms),
        }
    }
}

/// Counts samples and raises a single pending "ready" flag every `stride`
/// samples once `seq_length` samples have been seen.
#[derive(Debug, Clone)]
pub struct StrideGate {
    stride: u32,
    seq_length: u64,
    total_samples: u64,
    stride_counter: u32,
    ready: bool,
}

impl StrideGate {
    pub fn new(stride: u32, seq_length: usize) -> Self {
        Self {
            stride,
            seq_length: seq_length as u64,
            total_samples: 0,
            stride_counter: 0,
            ready: false,
        }
    }

    /// Account for one appended sample. Returns `true` if this sample raised readiness.
    pub fn record_sample(&mut self) -> bool {
        self.total_samples += 1;
        self.stride_counter += 1;

        if self.stride_counter >= self.stride && self.total_samples >= self.seq_length {
            self.stride_counter = 0;
            self.ready = true;
            return true;
        }
        false
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Consume the pending readiness, if any.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.ready)
    }

    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }
}
