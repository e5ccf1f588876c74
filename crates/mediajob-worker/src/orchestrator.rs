//! Orchestration loop for one encode job.
//!
//! Polls the job on a fixed interval until it reaches a terminal status and
//! finalizes it the first time the poller reports `Copying`. One loop per
//! job; the backend stays the only record of job state.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use mediajob_models::{EncodeJob, EncodeProgress, EncodeStatus};
use mediajob_storage::BlobStore;
use mediajob_transcode::TranscodeBackend;

use crate::cancel::{cancellable, sleep_or_cancel};
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::finalizer::{FinalizeReport, Finalizer};
use crate::logging::JobLogger;
use crate::poller::ProgressPoller;

/// Where the loop is in a job's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the backend to finish encoding
    Polling,
    /// `Copying` was seen and finalization has been triggered
    CopyingObserved,
    /// A terminal status was seen
    Done,
}

/// What the loop does after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    Wait,
    Finalize,
    Stop,
}

impl LoopState {
    /// Transition on a polled status.
    ///
    /// `Finalize` is only produced on the `Polling -> CopyingObserved` edge.
    pub fn on_status(self, status: EncodeStatus) -> (LoopState, LoopAction) {
        match (self, status) {
            (LoopState::Done, _) => (LoopState::Done, LoopAction::Stop),
            (_, status) if status.is_terminal() => (LoopState::Done, LoopAction::Stop),
            (LoopState::Polling, EncodeStatus::Copying) => {
                (LoopState::CopyingObserved, LoopAction::Finalize)
            }
            (state, _) => (state, LoopAction::Wait),
        }
    }
}

/// How a job left the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Encoded and in durable storage. `report` is set when this loop ran
    /// the finalization.
    Finished { report: Option<FinalizeReport> },
    /// The backend reported a job-level error
    Failed { details: String, progress: f64 },
    /// The backend has no record of the job
    NotFound,
    /// The backend canceled the job
    Canceled,
}

impl JobOutcome {
    fn from_terminal(progress: &EncodeProgress) -> Self {
        match progress.status {
            EncodeStatus::Finished => JobOutcome::Finished { report: None },
            EncodeStatus::Error => JobOutcome::Failed {
                details: progress.errors.clone().unwrap_or_default(),
                progress: progress.progress_percentage,
            },
            EncodeStatus::Canceled => JobOutcome::Canceled,
            _ => JobOutcome::NotFound,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Finished { .. })
    }
}

pub struct Orchestrator {
    poller: ProgressPoller,
    finalizer: Finalizer,
    poll_interval: Duration,
}

impl Orchestrator {
    pub fn new(poller: ProgressPoller, finalizer: Finalizer, poll_interval: Duration) -> Self {
        Self {
            poller,
            finalizer,
            poll_interval,
        }
    }

    pub fn from_config(
        store: Arc<dyn BlobStore>,
        backend: Arc<dyn TranscodeBackend>,
        config: &WorkerConfig,
    ) -> Self {
        Self::new(
            ProgressPoller::new(store.clone(), backend.clone()),
            Finalizer::new(
                store,
                backend,
                config.content_container.clone(),
                config.cleanup_retry.clone(),
            ),
            config.poll_interval,
        )
    }

    pub fn finalizer(&self) -> &Finalizer {
        &self.finalizer
    }

    /// Drive `job` to a terminal outcome.
    pub async fn run(
        &self,
        job: &EncodeJob,
        cancel: &CancellationToken,
    ) -> WorkerResult<JobOutcome> {
        self.run_with_progress(job, cancel, |_| {}).await
    }

    /// Like [`run`](Self::run), reporting every poll result to `on_progress`.
    ///
    /// Cancelling stops the loop with `Cancelled` and leaves the backend job
    /// running; a new loop on the same job resumes observing it.
    pub async fn run_with_progress<F>(
        &self,
        job: &EncodeJob,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> WorkerResult<JobOutcome>
    where
        F: FnMut(&EncodeProgress),
    {
        let logger = JobLogger::new(&job.job_name, job.content_id, "orchestrate");
        let span = logger.create_span();

        async {
            let target = self
                .finalizer
                .destination(job.content_id, &job.target_file_name);
            logger.log_start(&format!("polling every {:?}", self.poll_interval));

            let mut state = LoopState::Polling;
            loop {
                let progress =
                    cancellable(cancel, "poll", self.poller.poll(&job.job_name, &target)).await?;
                logger.log_progress(&progress);
                on_progress(&progress);

                let (next, action) = state.on_status(progress.status);
                state = next;

                match action {
                    LoopAction::Wait => {}
                    LoopAction::Finalize => {
                        let report = self
                            .finalizer
                            .finalize(&job.job_name, job.content_id, &job.target_file_name, cancel)
                            .await
                            .map_err(|e| {
                                logger.log_error(&format!("finalize failed: {}", e));
                                e
                            })?;
                        if !report.is_clean() {
                            logger.log_warning("backend bookkeeping left behind after copy");
                        }
                        logger.log_completion(&format!("finalized into {}", report.destination));
                        return Ok(JobOutcome::Finished {
                            report: Some(report),
                        });
                    }
                    LoopAction::Stop => {
                        let outcome = JobOutcome::from_terminal(&progress);
                        match &outcome {
                            JobOutcome::Failed { details, .. } => {
                                logger.log_error(&format!("encode failed: {}", details))
                            }
                            other => logger.log_completion(&format!("{:?}", other)),
                        }
                        return Ok(outcome);
                    }
                }

                if !sleep_or_cancel(cancel, self.poll_interval).await {
                    logger.log_warning("cancelled while polling, backend job keeps running");
                    return Err(WorkerError::cancelled("poll"));
                }
            }
        }
        .instrument(span)
        .await
    }
}
