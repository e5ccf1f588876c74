//! Finalization of a finished encode job.
//!
//! Copies the encoded object out of the backend's output asset into the
//! content container, then deletes the asset and finally the job. Nothing is
//! deleted unless the copy landed, so a failed finalize can simply be run
//! again.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use mediajob_models::{BackendJobState, ContentId, JobName, ObjectRef};
use mediajob_storage::{BlobStore, ContentContainer, NamedContainer};
use mediajob_transcode::{TranscodeBackend, TranscodeError};

use crate::cancel::cancellable;
use crate::error::{WorkerError, WorkerResult};
use crate::metrics;
use crate::retry::{retry_async, RetryConfig};

/// What a successful finalize left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeReport {
    /// Where the encoded object now lives
    pub destination: ObjectRef,
    pub asset_name: String,
    pub asset_deleted: bool,
    pub job_deleted: bool,
}

impl FinalizeReport {
    pub fn is_clean(&self) -> bool {
        self.asset_deleted && self.job_deleted
    }

    /// Treat leftover backend bookkeeping as an error.
    pub fn ensure_clean(&self) -> WorkerResult<()> {
        if self.is_clean() {
            return Ok(());
        }
        Err(WorkerError::storage_inconsistency(format!(
            "{} was copied but backend cleanup is incomplete (asset deleted: {}, job deleted: {})",
            self.destination, self.asset_deleted, self.job_deleted
        )))
    }
}

/// Outcome of the two bookkeeping deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub asset_deleted: bool,
    pub job_deleted: bool,
}

pub struct Finalizer {
    store: Arc<dyn BlobStore>,
    backend: Arc<dyn TranscodeBackend>,
    content_container: String,
    cleanup_retry: RetryConfig,
}

impl Finalizer {
    pub fn new(
        store: Arc<dyn BlobStore>,
        backend: Arc<dyn TranscodeBackend>,
        content_container: impl Into<String>,
        cleanup_retry: RetryConfig,
    ) -> Self {
        Self {
            store,
            backend,
            content_container: content_container.into(),
            cleanup_retry,
        }
    }

    /// Durable location of `target_file_name` for `content_id`.
    pub fn destination(&self, content_id: ContentId, target_file_name: &str) -> ObjectRef {
        ContentContainer::new(&self.content_container, content_id).blob(target_file_name)
    }

    /// Copy the job's output into durable storage and remove the backend job.
    ///
    /// Cancellation is honoured until the copy has landed; the bookkeeping
    /// deletes after it always run.
    pub async fn finalize(
        &self,
        job_name: &JobName,
        content_id: ContentId,
        target_file_name: &str,
        cancel: &CancellationToken,
    ) -> WorkerResult<FinalizeReport> {
        let start = Instant::now();
        let result = self
            .run_finalize(job_name, content_id, target_file_name, cancel)
            .await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let outcome = match &result {
            Ok(report) if report.is_clean() => "success",
            Ok(_) => "leftovers",
            Err(WorkerError::JobNotFound(_)) => "not_found",
            Err(WorkerError::EncodeFailed(_)) => "encode_failed",
            Err(WorkerError::Cancelled(_)) => "cancelled",
            Err(_) => "error",
        };
        metrics::record_finalize(outcome, latency_ms);

        result
    }

    async fn run_finalize(
        &self,
        job_name: &JobName,
        content_id: ContentId,
        target_file_name: &str,
        cancel: &CancellationToken,
    ) -> WorkerResult<FinalizeReport> {
        let job = cancellable(cancel, "get_job", self.backend.get_job(job_name))
            .await?
            .ok_or_else(|| WorkerError::job_not_found(job_name.to_string()))?;

        if job.state == BackendJobState::Error {
            return Err(WorkerError::encode_failed(job.error_details_text()));
        }

        let asset_name = job
            .first_output_asset_name()
            .ok_or_else(|| {
                WorkerError::malformed(format!("Job {} has no output asset", job_name))
            })?
            .to_string();

        let destination = self.destination(content_id, target_file_name);

        match cancellable(cancel, "get_asset", self.backend.get_asset(&asset_name)).await? {
            Some(asset) => {
                let container = NamedContainer::new(&asset.container).map_err(|e| {
                    WorkerError::malformed(format!("Asset {}: {}", asset_name, e))
                })?;
                let source = container.blob(target_file_name);

                let copied =
                    cancellable(cancel, "copy", self.store.copy(&source, &destination)).await?;
                if !copied {
                    return Err(WorkerError::storage_inconsistency(format!(
                        "Copy of {} to {} did not complete",
                        source, destination
                    )));
                }
                info!(job_name = %job_name, "Copied {} to {}", source, destination);
            }
            None => {
                // An earlier finalize may have deleted the asset but not the job
                if !self.is_populated(&destination, cancel).await? {
                    return Err(WorkerError::storage_inconsistency(format!(
                        "Output asset {} of job {} is gone and {} was never populated",
                        asset_name, job_name, destination
                    )));
                }
                info!(
                    job_name = %job_name,
                    "Output asset already removed, {} is in place", destination
                );
            }
        }

        let cleanup = self.cleanup(job_name, &asset_name).await;

        Ok(FinalizeReport {
            destination,
            asset_name,
            asset_deleted: cleanup.asset_deleted,
            job_deleted: cleanup.job_deleted,
        })
    }

    async fn is_populated(
        &self,
        destination: &ObjectRef,
        cancel: &CancellationToken,
    ) -> WorkerResult<bool> {
        if !cancellable(cancel, "exists", self.store.exists(destination)).await? {
            return Ok(false);
        }
        Ok(cancellable(cancel, "size", self.store.size(destination)).await? > 0)
    }

    /// Delete the output asset, then the job.
    ///
    /// Deletes are retried and a missing resource counts as deleted. The job
    /// is kept when the asset could not be deleted, so a later finalize can
    /// still find the asset through it.
    pub async fn cleanup(&self, job_name: &JobName, asset_name: &str) -> CleanupOutcome {
        let asset_deleted = match retry_async(
            &self.cleanup_retry.named("delete_asset"),
            TranscodeError::is_retryable,
            || self.backend.delete_asset(asset_name),
        )
        .await
        {
            Ok(()) => true,
            Err(e) => {
                metrics::record_cleanup_failure("asset");
                warn!(
                    job_name = %job_name,
                    output_asset = asset_name,
                    "Failed to delete output asset, keeping job for a later cleanup: {}", e
                );
                false
            }
        };

        if !asset_deleted {
            return CleanupOutcome {
                asset_deleted,
                job_deleted: false,
            };
        }

        let job_deleted = match retry_async(
            &self.cleanup_retry.named("delete_job"),
            TranscodeError::is_retryable,
            || self.backend.delete_job(job_name),
        )
        .await
        {
            Ok(()) => true,
            Err(e) => {
                metrics::record_cleanup_failure("job");
                warn!(job_name = %job_name, "Failed to delete job: {}", e);
                false
            }
        };

        CleanupOutcome {
            asset_deleted,
            job_deleted,
        }
    }
}
