//! Media Services REST resource shapes.

use serde::{Deserialize, Serialize};

use mediajob_models::{BackendJobState, JobName};

use crate::backend::{
    AssetRef, BackendAsset, BackendJob, JobErrorDetail, JobHandle, JobOutput, JobOutputError,
};
use crate::error::{TranscodeError, TranscodeResult};

const JOB_INPUT_HTTP: &str = "#Microsoft.Media.JobInputHttp";
const JOB_OUTPUT_ASSET: &str = "#Microsoft.Media.JobOutputAsset";

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct AssetRequest<'a> {
    pub properties: AssetRequestProperties<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssetRequestProperties<'a> {
    pub description: &'a str,
}

impl<'a> AssetRequest<'a> {
    pub fn new(description: &'a str) -> Self {
        Self {
            properties: AssetRequestProperties { description },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JobRequest<'a> {
    pub properties: JobRequestProperties<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct JobRequestProperties<'a> {
    pub input: JobInputHttp<'a>,
    pub outputs: Vec<JobOutputAsset<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct JobInputHttp<'a> {
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    pub files: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobOutputAsset<'a> {
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    pub asset_name: &'a str,
}

impl<'a> JobRequest<'a> {
    /// A job with one HTTP input file and one output asset.
    pub fn new(input_url: &'a str, output_asset: &'a str) -> Self {
        Self {
            properties: JobRequestProperties {
                input: JobInputHttp {
                    odata_type: JOB_INPUT_HTTP,
                    files: vec![input_url],
                },
                outputs: vec![JobOutputAsset {
                    odata_type: JOB_OUTPUT_ASSET,
                    asset_name: output_asset,
                }],
            },
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct AssetResource {
    pub name: String,
    #[serde(default)]
    pub properties: AssetProperties,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AssetProperties {
    pub container: Option<String>,
}

impl AssetResource {
    pub fn into_ref(self) -> AssetRef {
        AssetRef {
            name: self.name,
            container: self.properties.container,
        }
    }

    pub fn into_asset(self) -> TranscodeResult<BackendAsset> {
        let container = self.properties.container.ok_or_else(|| {
            TranscodeError::invalid_response(format!("Asset '{}' has no container", self.name))
        })?;
        Ok(BackendAsset {
            name: self.name,
            container,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobResource {
    pub name: String,
    pub properties: JobProperties,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobProperties {
    pub state: BackendJobState,
    #[serde(default)]
    pub outputs: Vec<JobOutputResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobOutputResource {
    pub asset_name: Option<String>,
    pub state: Option<BackendJobState>,
    #[serde(default)]
    pub progress: f64,
    pub error: Option<JobErrorResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobErrorResource {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub details: Vec<JobErrorDetailResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobErrorDetailResource {
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl JobResource {
    pub fn into_handle(self) -> JobHandle {
        JobHandle {
            name: JobName(self.name),
            state: self.properties.state,
        }
    }
}

impl From<JobResource> for BackendJob {
    fn from(resource: JobResource) -> Self {
        BackendJob {
            name: JobName(resource.name),
            state: resource.properties.state,
            outputs: resource
                .properties
                .outputs
                .into_iter()
                .map(|output| JobOutput {
                    asset_name: output.asset_name,
                    state: output.state,
                    progress: output.progress,
                    error: output.error.map(|error| JobOutputError {
                        code: error.code,
                        message: error.message,
                        details: error
                            .details
                            .into_iter()
                            .map(|detail| JobErrorDetail {
                                code: detail.code,
                                message: detail.message,
                            })
                            .collect(),
                    }),
                })
                .collect(),
        }
    }
}

/// ARM error envelope: `{"error": {"code": ..., "message": ...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
