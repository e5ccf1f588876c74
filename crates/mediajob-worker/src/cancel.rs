//! Cancellation of in-flight network calls.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{WorkerError, WorkerResult};

/// Run `fut` unless `cancel` fires first, in which case the call is dropped.
pub async fn cancellable<T, E, F>(
    cancel: &CancellationToken,
    operation: &str,
    fut: F,
) -> WorkerResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<WorkerError>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(WorkerError::cancelled(operation.to_string())),
        result = fut => result.map_err(Into::into),
    }
}

/// Suspend for `duration`; returns `false` if `cancel` fired first.
pub async fn sleep_or_cancel(cancel: &CancellationToken, duration: std::time::Duration) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
