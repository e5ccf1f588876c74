//! Worker error types.

use thiserror::Error;

use mediajob_storage::StorageError;
use mediajob_transcode::TranscodeError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Transport, auth or HTTP failure talking to the backend or the blob store.
    #[error("Backend communication failed: {0}")]
    BackendCommunication(String),

    #[error("Malformed backend response: {0}")]
    MalformedBackendResponse(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// The backend reported a job-level error; the text is its detail messages.
    #[error("Encode failed: {0}")]
    EncodeFailed(String),

    #[error("Storage inconsistency: {0}")]
    StorageInconsistency(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn unsupported_media_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedMediaType(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedBackendResponse(msg.into())
    }

    pub fn job_not_found(msg: impl Into<String>) -> Self {
        Self::JobNotFound(msg.into())
    }

    pub fn encode_failed(details: impl Into<String>) -> Self {
        Self::EncodeFailed(details.into())
    }

    pub fn storage_inconsistency(msg: impl Into<String>) -> Self {
        Self::StorageInconsistency(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Check if error is retryable.
    ///
    /// Only communication failures are; re-running the whole operation is safe.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkerError::BackendCommunication(_) | WorkerError::Io(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WorkerError::Cancelled(_))
    }

    /// The backend no longer knows the job, most likely already finalized.
    pub fn is_not_found(&self) -> bool {
        matches!(self, WorkerError::JobNotFound(_))
    }
}

impl From<TranscodeError> for WorkerError {
    fn from(e: TranscodeError) -> Self {
        match e {
            TranscodeError::ConfigError(msg) => WorkerError::ConfigError(msg),
            e if e.is_malformed() => WorkerError::MalformedBackendResponse(e.to_string()),
            e => WorkerError::BackendCommunication(e.to_string()),
        }
    }
}

impl From<StorageError> for WorkerError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::ConfigError(msg) => WorkerError::ConfigError(msg),
            StorageError::Io(e) => WorkerError::Io(e),
            e => WorkerError::BackendCommunication(e.to_string()),
        }
    }
}
