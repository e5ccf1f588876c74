//! Encode job submission.
//!
//! A submission creates the output asset first and then the job that reads
//! the source through a time-limited URL. It only counts as started once the
//! backend acknowledges the job.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use mediajob_models::{ContentId, EncodeJob, JobName, ObjectRef, SubmissionNames};
use mediajob_storage::{BlobStore, ANY_SOURCE_IP};
use mediajob_transcode::TranscodeBackend;

use crate::cancel::cancellable;
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::metrics;

pub struct JobSubmitter {
    store: Arc<dyn BlobStore>,
    backend: Arc<dyn TranscodeBackend>,
    config: Arc<WorkerConfig>,
}

impl JobSubmitter {
    pub fn new(
        store: Arc<dyn BlobStore>,
        backend: Arc<dyn TranscodeBackend>,
        config: Arc<WorkerConfig>,
    ) -> Self {
        Self {
            store,
            backend,
            config,
        }
    }

    /// Fail with `UnsupportedMediaType` unless `source` has an allowed extension.
    pub fn check_media_type(&self, source: &ObjectRef) -> WorkerResult<()> {
        match source.extension() {
            Some(ext) if self.config.is_supported_extension(&ext) => Ok(()),
            Some(ext) => Err(WorkerError::unsupported_media_type(format!(
                "{} ({} is not a supported video type)",
                source, ext
            ))),
            None => Err(WorkerError::unsupported_media_type(format!(
                "{} (no file extension)",
                source
            ))),
        }
    }

    /// Submit `source` for encoding under the backend's transform.
    ///
    /// Cancelling before the backend acknowledges the job removes whatever
    /// part of the submission may already exist there.
    pub async fn submit(
        &self,
        source: &ObjectRef,
        target_file_name: &str,
        content_id: ContentId,
        cancel: &CancellationToken,
    ) -> WorkerResult<EncodeJob> {
        self.check_media_type(source)?;

        let transform_name = self.backend.transform_name();
        let names = SubmissionNames::generate(content_id);
        info!(
            job_name = %names.job,
            content_id = %content_id,
            transform = transform_name,
            "Submitting encode job for {}", source
        );

        let input_url =
            cancellable(cancel, "read_url", self.store.read_url(source, ANY_SOURCE_IP)).await?;

        let description = format!("{}-{}", content_id, target_file_name);
        let asset = match cancellable(
            cancel,
            "create_asset",
            self.backend.create_asset(&names.output_asset, &description),
        )
        .await
        {
            Ok(asset) => asset,
            Err(e) => {
                if e.is_cancelled() {
                    // The create may have landed before the call was dropped
                    self.discard_asset(&names.output_asset).await;
                }
                return Err(e);
            }
        };

        let handle = match cancellable(
            cancel,
            "create_job",
            self.backend
                .create_job(transform_name, &names.job, &input_url, &asset),
        )
        .await
        {
            Ok(handle) => handle,
            Err(e) => {
                if e.is_cancelled() {
                    // The job may have been created before the call was dropped
                    self.discard_job(&names.job).await;
                }
                self.discard_asset(&asset.name).await;
                return Err(e);
            }
        };

        metrics::record_submitted(transform_name);
        info!(
            job_name = %handle.name,
            state = %handle.state,
            output_asset = %asset.name,
            "Encode job accepted"
        );

        Ok(EncodeJob {
            job_name: handle.name,
            content_id,
            source: source.clone(),
            target_file_name: target_file_name.to_string(),
            transform_name: transform_name.to_string(),
            output_asset_name: Some(asset.name),
            submitted_at: Utc::now(),
        })
    }

    /// Best-effort removal of a job whose submission was abandoned.
    async fn discard_job(&self, job_name: &JobName) {
        if let Err(e) = self.backend.delete_job(job_name).await {
            warn!(job_name = %job_name, "Failed to delete abandoned job: {}", e);
        }
    }

    /// Best-effort removal of an asset no job will ever write to.
    async fn discard_asset(&self, asset_name: &str) {
        if let Err(e) = self.backend.delete_asset(asset_name).await {
            warn!(output_asset = asset_name, "Failed to delete orphaned asset: {}", e);
        }
    }
}
