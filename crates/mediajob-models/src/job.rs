//! Encode job definitions.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::ObjectRef;

/// Identifier of the content item that owns a job's media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ContentId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Backend job name. Unique per submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobName(pub String);

impl JobName {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Names for one submission: the job and its output asset share a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionNames {
    pub job: JobName,
    pub output_asset: String,
}

impl SubmissionNames {
    /// Generate fresh names for `content_id`.
    ///
    /// The token is `{content_id}-{uuid v4 without dashes}`, giving 122 random bits.
    pub fn generate(content_id: ContentId) -> Self {
        let token = format!("{}-{}", content_id, Uuid::new_v4().simple());
        Self {
            job: JobName(format!("job-{}", token)),
            output_asset: format!("output-{}", token),
        }
    }
}

/// One submitted transcoding request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodeJob {
    /// Backend job name
    pub job_name: JobName,
    /// Owning content item
    pub content_id: ContentId,
    /// Uploaded input object
    pub source: ObjectRef,
    /// Name under which the encoded object must appear in the content container
    pub target_file_name: String,
    /// Transform profile the job runs
    pub transform_name: String,
    /// Backend-managed output asset; set once the backend accepts the job
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_asset_name: Option<String>,
    /// When the backend acknowledged the job
    pub submitted_at: DateTime<Utc>,
}
