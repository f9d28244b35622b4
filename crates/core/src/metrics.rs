//! Prometheus metrics for the pipeline.
//!
//! Covers uploads, job lifecycle and poller behavior. The server exposes
//! these through its `/metrics` endpoint.

use once_cell::sync::Lazy;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};

/// Uploads accepted or rejected, by result.
pub static UPLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("retrato_uploads_total", "Total upload submissions"),
        &["result"], // "accepted", "invalid", "storage_error"
    )
    .unwrap()
});

/// Transformation jobs started upstream.
pub static JOBS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "retrato_jobs_started_total",
        "Total transformation jobs created",
    )
    .unwrap()
});

/// Uploads that returned without a job because the upstream was
/// unreachable.
pub static DEGRADED_SUBMITS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "retrato_degraded_submits_total",
        "Uploads that could not start a transformation job",
    )
    .unwrap()
});

/// Jobs that reached a terminal state, by outcome.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "retrato_jobs_finished_total",
            "Total jobs that reached a terminal state",
        ),
        &["outcome"], // "succeeded", "failed", "timed_out", "canceled"
    )
    .unwrap()
});

/// Transient poll-call failures that were retried.
pub static POLL_TRANSIENT_RETRIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "retrato_poll_transient_retries_total",
        "Poll calls retried after a transient failure",
    )
    .unwrap()
});

/// Wall-clock duration from job creation to terminal state.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "retrato_job_duration_seconds",
            "Duration from job creation to terminal state",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Register all pipeline metrics on a registry.
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(UPLOADS.clone()))?;
    registry.register(Box::new(JOBS_STARTED.clone()))?;
    registry.register(Box::new(DEGRADED_SUBMITS.clone()))?;
    registry.register(Box::new(JOBS_FINISHED.clone()))?;
    registry.register(Box::new(POLL_TRANSIENT_RETRIES.clone()))?;
    registry.register(Box::new(JOB_DURATION.clone()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_metrics() {
        let registry = Registry::new();
        register_metrics(&registry).unwrap();

        JOBS_STARTED.inc();
        JOBS_FINISHED.with_label_values(&["succeeded"]).inc();

        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "retrato_jobs_started_total"));
    }
}
