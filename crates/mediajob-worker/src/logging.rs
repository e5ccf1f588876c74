//! Structured job logging utilities.
//!
//! Every line carries the backend job name and the operation, so one job can
//! be followed across submit, poll and finalize.

use tracing::{error, info, warn, Span};

use mediajob_models::{ContentId, EncodeProgress, JobName};

/// Job logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_name: String,
    content_id: ContentId,
    operation: String,
}

impl JobLogger {
    pub fn new(job_name: &JobName, content_id: ContentId, operation: &str) -> Self {
        Self {
            job_name: job_name.to_string(),
            content_id,
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            job_name = %self.job_name,
            content_id = %self.content_id,
            operation = %self.operation,
            "Job started: {}", message
        );
    }

    /// Log one poll result.
    pub fn log_progress(&self, progress: &EncodeProgress) {
        info!(
            job_name = %self.job_name,
            content_id = %self.content_id,
            operation = %self.operation,
            status = %progress.status,
            progress = progress.progress_percentage,
            "Job progress"
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            job_name = %self.job_name,
            content_id = %self.content_id,
            operation = %self.operation,
            "Job warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            job_name = %self.job_name,
            content_id = %self.content_id,
            operation = %self.operation,
            "Job error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            job_name = %self.job_name,
            content_id = %self.content_id,
            operation = %self.operation,
            "Job completed: {}", message
        );
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_name = %self.job_name,
            content_id = %self.content_id,
            operation = %self.operation
        )
    }
}
