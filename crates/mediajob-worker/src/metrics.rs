//! Encode job metrics.
//!
//! Counters for submissions, polls by status, finalizations by outcome and
//! failed cleanup deletes, plus a finalize latency histogram.

use metrics::{counter, histogram};

use mediajob_models::EncodeStatus;

/// Metric name constants for consistency.
pub mod names {
    /// Jobs accepted by the backend, by transform.
    pub const JOBS_SUBMITTED_TOTAL: &str = "mediajob_jobs_submitted_total";

    /// Poll results by reported status.
    pub const POLLS_TOTAL: &str = "mediajob_polls_total";

    /// Finalize attempts by outcome.
    pub const FINALIZATIONS_TOTAL: &str = "mediajob_finalizations_total";

    /// Backend deletes that failed after retries, by resource.
    pub const CLEANUP_FAILURES_TOTAL: &str = "mediajob_cleanup_failures_total";

    /// Finalize latency in seconds.
    pub const FINALIZE_SECONDS: &str = "mediajob_finalize_seconds";
}

pub fn record_submitted(transform: &str) {
    counter!(
        names::JOBS_SUBMITTED_TOTAL,
        "transform" => transform.to_string()
    )
    .increment(1);
}

pub fn record_poll(status: EncodeStatus) {
    counter!(
        names::POLLS_TOTAL,
        "status" => status.as_str()
    )
    .increment(1);
}

/// Record a finished finalize attempt.
pub fn record_finalize(outcome: &'static str, latency_ms: f64) {
    counter!(
        names::FINALIZATIONS_TOTAL,
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        names::FINALIZE_SECONDS,
        "outcome" => outcome
    )
    .record(latency_ms / 1000.0);
}

pub fn record_cleanup_failure(resource: &'static str) {
    counter!(
        names::CLEANUP_FAILURES_TOTAL,
        "resource" => resource
    )
    .increment(1);
}
