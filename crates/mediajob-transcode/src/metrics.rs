//! Backend request metrics.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total backend requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "transcode_requests_total";

    /// Requests replayed after a rejected bearer token.
    pub const TOKEN_RETRIES_TOTAL: &str = "transcode_token_retries_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "transcode_latency_seconds";
}

/// Record metrics for a completed backend request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

pub fn record_token_retry(operation: &str) {
    counter!(
        names::TOKEN_RETRIES_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}
