//! Transcoding backend abstraction.
//!
//! Implementations must be safe to share between concurrently orchestrated
//! jobs. Deletes are idempotent: removing something that is already gone
//! succeeds.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mediajob_models::{BackendJobState, JobName};

use crate::error::TranscodeResult;

/// Handle to a backend-managed output asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub name: String,
    /// Storage container backing the asset, when the backend reports it
    pub container: Option<String>,
}

/// A backend asset resolved to its storage container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendAsset {
    pub name: String,
    pub container: String,
}

/// Acknowledgement of a created job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub name: JobName,
    pub state: BackendJobState,
}

/// One detail line of an output error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobErrorDetail {
    pub code: Option<String>,
    pub message: String,
}

/// Error reported for one job output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutputError {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Vec<JobErrorDetail>,
}

/// State of one job output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutput {
    /// Asset the output is written to
    pub asset_name: Option<String>,
    pub state: Option<BackendJobState>,
    /// Progress percentage (0-100)
    pub progress: f64,
    pub error: Option<JobOutputError>,
}

impl JobOutput {
    /// All error detail messages joined with no separator, in reported order.
    pub fn error_details_text(&self) -> String {
        self.error
            .as_ref()
            .map(|error| error.details.iter().map(|d| d.message.as_str()).collect::<String>())
            .unwrap_or_default()
    }
}

/// Snapshot of a backend job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendJob {
    pub name: JobName,
    pub state: BackendJobState,
    pub outputs: Vec<JobOutput>,
}

impl BackendJob {
    pub fn first_output(&self) -> Option<&JobOutput> {
        self.outputs.first()
    }

    /// Asset name of the first output, if it writes to an asset.
    pub fn first_output_asset_name(&self) -> Option<&str> {
        self.first_output().and_then(|o| o.asset_name.as_deref())
    }

    /// Error detail text of the first output; empty when there is none.
    pub fn error_details_text(&self) -> String {
        self.first_output()
            .map(JobOutput::error_details_text)
            .unwrap_or_default()
    }
}

/// Remote service that runs encode jobs.
#[async_trait]
pub trait TranscodeBackend: Send + Sync {
    /// Transform new jobs run under. Jobs are looked up and deleted through it.
    fn transform_name(&self) -> &str;

    /// Make sure the named transform exists, creating the default preset if not.
    async fn ensure_transform(&self, transform_name: &str) -> TranscodeResult<()>;

    /// Create (or overwrite) an output asset.
    async fn create_asset(&self, name: &str, description: &str) -> TranscodeResult<AssetRef>;

    /// Submit a job reading `input_url` and writing into `output_asset`.
    ///
    /// `transform_name` must be [`transform_name`](Self::transform_name), or
    /// the job could not be found again.
    async fn create_job(
        &self,
        transform_name: &str,
        job_name: &JobName,
        input_url: &str,
        output_asset: &AssetRef,
    ) -> TranscodeResult<JobHandle>;

    /// Fetch a job, or `None` if the backend has no record of it.
    async fn get_job(&self, job_name: &JobName) -> TranscodeResult<Option<BackendJob>>;

    /// Fetch an asset, or `None` if the backend has no record of it.
    async fn get_asset(&self, name: &str) -> TranscodeResult<Option<BackendAsset>>;

    async fn delete_asset(&self, name: &str) -> TranscodeResult<()>;

    async fn delete_job(&self, job_name: &JobName) -> TranscodeResult<()>;
}
