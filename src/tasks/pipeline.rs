// PunchWatch — Pipeline Task
//
// Cooperative scheduler loop: polls the clock and lets the pipeline run
// whichever of the sampling / classification ticks is due.

use std::thread;
use std::time::Duration;

use punchwatch::config::*;
use punchwatch::scheduler::Periodic;
use punchwatch::{Classifier, Clock, Pipeline, SensorSource, Telemetry};

const STATS_INTERVAL_MS: u64 = 10_000;

pub fn pipeline_task<S, C, T, K>(mut pipeline: Pipeline<S, C, T>, clock: K)
where
    S: SensorSource,
    C: Classifier,
    T: Telemetry,
    K: Clock,
{
    log::info!("Pipeline task started");

    let poll = Duration::from_millis(PIPELINE_POLL_MS);
    let mut report = Periodic::new(STATS_INTERVAL_MS, clock.now_ms());

    loop {
        let now = clock.now_ms();
        pipeline.poll(now);

        if report.poll(now) {
            let stats = pipeline.stats();
            log::info!(
                "samples={} windows={} punches={} suppressed={} faults: imu={} model={} mqtt={}",
                stats.samples,
                stats.windows_classified,
                stats.decisions_accepted,
                stats.decisions_suppressed,
                stats.acquisition_faults,
                stats.classifier_faults,
                stats.telemetry_faults,
            );
        }

        thread::sleep(poll);
    }
}
