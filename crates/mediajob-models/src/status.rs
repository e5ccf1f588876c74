//! Encode status and progress snapshots.
//!
//! The transcoding backend reports its own job states; the orchestrator maps
//! them onto [`EncodeStatus`], which adds the client-side `Copying` status.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain-level status of an encode job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum EncodeStatus {
    /// The backend has no record of the job
    #[default]
    NotFound,
    /// Accepted, waiting for resources
    Queued,
    /// Resources allocated, about to start
    Scheduled,
    /// Encoding in progress
    Processing,
    /// Encoded and copied into durable storage
    Finished,
    /// Backend finished encoding but the durable copy is not visible yet.
    ///
    /// Never reported by the backend; synthesized by the poller.
    Copying,
    /// Backend reported a job-level error
    Error,
    /// Backend canceled the job
    Canceled,
    /// Backend is canceling the job
    Canceling,
}

impl EncodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodeStatus::NotFound => "not_found",
            EncodeStatus::Queued => "queued",
            EncodeStatus::Scheduled => "scheduled",
            EncodeStatus::Processing => "processing",
            EncodeStatus::Finished => "finished",
            EncodeStatus::Copying => "copying",
            EncodeStatus::Error => "error",
            EncodeStatus::Canceled => "canceled",
            EncodeStatus::Canceling => "canceling",
        }
    }

    /// Map a backend-native job state onto the domain status.
    ///
    /// Total and deterministic; anything unrecognized becomes `NotFound`.
    pub fn from_backend(state: &BackendJobState) -> Self {
        match state {
            BackendJobState::Queued => EncodeStatus::Queued,
            BackendJobState::Scheduled => EncodeStatus::Scheduled,
            BackendJobState::Processing => EncodeStatus::Processing,
            BackendJobState::Finished => EncodeStatus::Finished,
            BackendJobState::Error => EncodeStatus::Error,
            BackendJobState::Canceled => EncodeStatus::Canceled,
            BackendJobState::Canceling => EncodeStatus::Canceling,
            BackendJobState::Unknown(_) => EncodeStatus::NotFound,
        }
    }

    /// Check if no further status changes are expected for this job.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EncodeStatus::Finished | EncodeStatus::Error | EncodeStatus::NotFound | EncodeStatus::Canceled
        )
    }
}

impl fmt::Display for EncodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Job state as reported by the transcoding backend.
///
/// Deserializes from the backend's string form. Values outside the known set
/// are kept verbatim in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BackendJobState {
    Queued,
    Scheduled,
    Processing,
    Finished,
    Error,
    Canceled,
    Canceling,
    Unknown(String),
}

impl BackendJobState {
    pub fn as_str(&self) -> &str {
        match self {
            BackendJobState::Queued => "Queued",
            BackendJobState::Scheduled => "Scheduled",
            BackendJobState::Processing => "Processing",
            BackendJobState::Finished => "Finished",
            BackendJobState::Error => "Error",
            BackendJobState::Canceled => "Canceled",
            BackendJobState::Canceling => "Canceling",
            BackendJobState::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for BackendJobState {
    fn from(s: &str) -> Self {
        match s {
            "Queued" => BackendJobState::Queued,
            "Scheduled" => BackendJobState::Scheduled,
            "Processing" => BackendJobState::Processing,
            "Finished" => BackendJobState::Finished,
            "Error" => BackendJobState::Error,
            "Canceled" => BackendJobState::Canceled,
            "Canceling" => BackendJobState::Canceling,
            other => BackendJobState::Unknown(other.to_string()),
        }
    }
}

impl From<String> for BackendJobState {
    fn from(s: String) -> Self {
        BackendJobState::from(s.as_str())
    }
}

impl From<BackendJobState> for String {
    fn from(state: BackendJobState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for BackendJobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one poll against the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodeProgress {
    /// Current status
    pub status: EncodeStatus,
    /// Progress percentage (0-100), meaningful while processing
    pub progress_percentage: f64,
    /// Concatenated error details, set when the backend reports an error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
}

impl EncodeProgress {
    /// Snapshot with only a status.
    pub fn status(status: EncodeStatus) -> Self {
        Self {
            status,
            progress_percentage: 0.0,
            errors: None,
        }
    }

    /// The backend has no record of the job.
    pub fn not_found() -> Self {
        Self {
            status: EncodeStatus::NotFound,
            progress_percentage: 0.0,
            errors: Some("Not found".to_string()),
        }
    }

    /// Encoding in progress at `percentage` (clamped to 0-100).
    pub fn processing(percentage: f64) -> Self {
        Self {
            status: EncodeStatus::Processing,
            progress_percentage: percentage.clamp(0.0, 100.0),
            errors: None,
        }
    }

    /// Backend reported a job-level error.
    pub fn error(percentage: f64, errors: impl Into<String>) -> Self {
        Self {
            status: EncodeStatus::Error,
            progress_percentage: percentage.clamp(0.0, 100.0),
            errors: Some(errors.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
