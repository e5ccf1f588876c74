//! Progress polling.
//!
//! Reads the backend job and maps it to an [`EncodeProgress`]. Terminal and
//! error states reported by the backend are normal results; only transport
//! failures and malformed payloads fail the poll.

use std::sync::Arc;

use tracing::{debug, warn};

use mediajob_models::{BackendJobState, EncodeProgress, EncodeStatus, JobName, ObjectRef};
use mediajob_storage::BlobStore;
use mediajob_transcode::{BackendJob, TranscodeBackend};

use crate::error::{WorkerError, WorkerResult};
use crate::metrics;

pub struct ProgressPoller {
    store: Arc<dyn BlobStore>,
    backend: Arc<dyn TranscodeBackend>,
}

impl ProgressPoller {
    pub fn new(store: Arc<dyn BlobStore>, backend: Arc<dyn TranscodeBackend>) -> Self {
        Self { store, backend }
    }

    /// Current progress of `job_name`, whose output is destined for `target`.
    pub async fn poll(
        &self,
        job_name: &JobName,
        target: &ObjectRef,
    ) -> WorkerResult<EncodeProgress> {
        let progress = match self.backend.get_job(job_name).await? {
            None => EncodeProgress::not_found(),
            Some(job) => self.progress_of(&job, target).await?,
        };

        debug!(
            job_name = %job_name,
            status = %progress.status,
            progress = progress.progress_percentage,
            "Polled encode job"
        );
        metrics::record_poll(progress.status);

        Ok(progress)
    }

    async fn progress_of(
        &self,
        job: &BackendJob,
        target: &ObjectRef,
    ) -> WorkerResult<EncodeProgress> {
        if let BackendJobState::Unknown(state) = &job.state {
            warn!(job_name = %job.name, state = %state, "Unrecognized backend job state");
        }

        match EncodeStatus::from_backend(&job.state) {
            EncodeStatus::Processing => {
                let output = job.first_output().ok_or_else(|| {
                    WorkerError::malformed(format!("Processing job {} reports no outputs", job.name))
                })?;
                Ok(EncodeProgress::processing(output.progress))
            }
            EncodeStatus::Finished => {
                if self.awaiting_copy(target).await? {
                    Ok(EncodeProgress::status(EncodeStatus::Copying))
                } else {
                    Ok(EncodeProgress::status(EncodeStatus::Finished))
                }
            }
            EncodeStatus::Error => Ok(match job.first_output() {
                Some(output) => EncodeProgress::error(output.progress, output.error_details_text()),
                None => EncodeProgress::error(0.0, String::new()),
            }),
            status => Ok(EncodeProgress::status(status)),
        }
    }

    /// The destination is missing or still the empty placeholder.
    async fn awaiting_copy(&self, target: &ObjectRef) -> WorkerResult<bool> {
        if !self.store.exists(target).await? {
            return Ok(true);
        }
        Ok(self.store.size(target).await? < 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::{failed_job, job, FakeBackend, FakeBlobStore};

    fn setup() -> (Arc<FakeBlobStore>, Arc<FakeBackend>, ProgressPoller) {
        let store = Arc::new(FakeBlobStore::new());
        let backend = Arc::new(FakeBackend::new());
        let poller = ProgressPoller::new(store.clone(), backend.clone());
        (store, backend, poller)
    }

    fn target() -> ObjectRef {
        ObjectRef::new("content", "7/clip.mp4")
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let (_, _, poller) = setup();

        let progress = poller.poll(&JobName::from("job-gone"), &target()).await.unwrap();
        assert_eq!(progress, EncodeProgress::not_found());
        assert_eq!(progress.errors.as_deref(), Some("Not found"));
    }

    #[tokio::test]
    async fn test_processing_reports_first_output_progress() {
        let (_, backend, poller) = setup();
        let name = JobName::from("job-7-abc");
        backend.insert_job(job(&name, BackendJobState::Processing, "output-7-abc", 42.0));

        let progress = poller.poll(&name, &target()).await.unwrap();
        assert_eq!(progress.status, EncodeStatus::Processing);
        assert_eq!(progress.progress_percentage, 42.0);
        assert_eq!(progress.errors, None);
    }

    #[tokio::test]
    async fn test_processing_without_outputs_is_malformed() {
        let (_, backend, poller) = setup();
        let name = JobName::from("job-7-abc");
        let mut snapshot = job(&name, BackendJobState::Processing, "output-7-abc", 0.0);
        snapshot.outputs.clear();
        backend.insert_job(snapshot);

        let err = poller.poll(&name, &target()).await.unwrap_err();
        assert!(matches!(err, WorkerError::MalformedBackendResponse(_)));
    }

    #[tokio::test]
    async fn test_finished_with_empty_destination_is_copying() {
        let (store, backend, poller) = setup();
        let name = JobName::from("job-7-abc");
        backend.insert_job(job(&name, BackendJobState::Finished, "output-7-abc", 100.0));
        store.put(&target(), b"");

        let progress = poller.poll(&name, &target()).await.unwrap();
        assert_eq!(progress, EncodeProgress::status(EncodeStatus::Copying));
    }

    #[tokio::test]
    async fn test_finished_with_missing_destination_is_copying() {
        let (_, backend, poller) = setup();
        let name = JobName::from("job-7-abc");
        backend.insert_job(job(&name, BackendJobState::Finished, "output-7-abc", 100.0));

        let progress = poller.poll(&name, &target()).await.unwrap();
        assert_eq!(progress.status, EncodeStatus::Copying);
    }

    #[tokio::test]
    async fn test_finished_with_copied_destination() {
        let (store, backend, poller) = setup();
        let name = JobName::from("job-7-abc");
        backend.insert_job(job(&name, BackendJobState::Finished, "output-7-abc", 100.0));
        store.put(&target(), b"encoded");

        let progress = poller.poll(&name, &target()).await.unwrap();
        assert_eq!(progress.status, EncodeStatus::Finished);
    }

    #[tokio::test]
    async fn test_error_concatenates_details() {
        let (_, backend, poller) = setup();
        let name = JobName::from("job-7-abc");
        backend.insert_job(failed_job(&name, "output-7-abc", 40.0, &["A: bad codec", "B: timeout"]));

        let progress = poller.poll(&name, &target()).await.unwrap();
        assert_eq!(progress.status, EncodeStatus::Error);
        assert_eq!(progress.progress_percentage, 40.0);
        assert_eq!(progress.errors.as_deref(), Some("A: bad codecB: timeout"));
    }

    #[tokio::test]
    async fn test_error_without_outputs_does_not_fail() {
        let (_, backend, poller) = setup();
        let name = JobName::from("job-7-abc");
        let mut snapshot = failed_job(&name, "output-7-abc", 40.0, &["A"]);
        snapshot.outputs.clear();
        backend.insert_job(snapshot);

        let progress = poller.poll(&name, &target()).await.unwrap();
        assert_eq!(progress.status, EncodeStatus::Error);
        assert_eq!(progress.progress_percentage, 0.0);
        assert_eq!(progress.errors.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_state_mapping_passes_through() {
        let (store, backend, poller) = setup();
        let name = JobName::from("job-7-abc");

        for (state, expected) in [
            (BackendJobState::Queued, EncodeStatus::Queued),
            (BackendJobState::Scheduled, EncodeStatus::Scheduled),
            (BackendJobState::Canceling, EncodeStatus::Canceling),
            (BackendJobState::Canceled, EncodeStatus::Canceled),
            (BackendJobState::Unknown("Paused".to_string()), EncodeStatus::NotFound),
        ] {
            backend.insert_job(job(&name, state, "output-7-abc", 0.0));
            let progress = poller.poll(&name, &target()).await.unwrap();
            assert_eq!(progress.status, expected);
        }

        // No storage reads outside the Finished branch
        assert_eq!(store.calls.total(), 0);
    }
}
