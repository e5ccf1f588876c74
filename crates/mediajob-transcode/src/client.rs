//! Media Services v3 REST client.
//!
//! Talks to the ARM management plane with:
//! - Client-credential bearer tokens from a shared cache
//! - One replay after a 401 with a freshly fetched token
//! - Tracing spans and request metrics per call

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, info_span, Instrument};

use mediajob_models::JobName;

use crate::backend::{AssetRef, BackendAsset, BackendJob, JobHandle, TranscodeBackend};
use crate::error::{TranscodeError, TranscodeResult};
use crate::metrics::{record_request, record_token_retry};
use crate::token_cache::{AadCredentials, TokenCache};
use crate::transform::standard_encoder_transform;
use crate::wire::{AssetRequest, AssetResource, ErrorEnvelope, JobRequest, JobResource};

// =============================================================================
// Configuration
// =============================================================================

/// Media Services client configuration.
#[derive(Debug, Clone)]
pub struct MediaServicesConfig {
    /// ARM endpoint, e.g. `https://management.azure.com`
    pub arm_endpoint: String,
    /// Token authority, e.g. `https://login.microsoftonline.com`
    pub aad_endpoint: String,
    /// Resource the bearer token is requested for
    pub arm_audience: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub account_name: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// Transform used for job lookups and deletes
    pub transform_name: String,
    pub api_version: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

fn required_env(key: &str) -> TranscodeResult<String> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(TranscodeError::config_error(format!("{} not set", key))),
    }
}

impl MediaServicesConfig {
    /// Create config from environment variables.
    pub fn from_env() -> TranscodeResult<Self> {
        let timeout_secs: u64 = std::env::var("MEDIA_SERVICES_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        let connect_timeout_secs: u64 = std::env::var("MEDIA_SERVICES_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            arm_endpoint: std::env::var("ARM_ENDPOINT")
                .unwrap_or_else(|_| "https://management.azure.com".to_string()),
            aad_endpoint: std::env::var("AAD_ENDPOINT")
                .unwrap_or_else(|_| "https://login.microsoftonline.com".to_string()),
            arm_audience: std::env::var("ARM_AAD_AUDIENCE")
                .unwrap_or_else(|_| "https://management.core.windows.net/".to_string()),
            subscription_id: required_env("SUBSCRIPTION_ID")?,
            resource_group: required_env("RESOURCE_GROUP")?,
            account_name: required_env("ACCOUNT_NAME")?,
            tenant_id: required_env("AAD_TENANT_ID")?,
            client_id: required_env("AAD_CLIENT_ID")?,
            client_secret: required_env("AAD_SECRET")?,
            transform_name: required_env("MEDIA_SERVICES_TRANSFORM")?,
            api_version: std::env::var("MEDIA_SERVICES_API_VERSION")
                .unwrap_or_else(|_| "2022-07-01".to_string()),
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        })
    }

    fn credentials(&self) -> AadCredentials {
        AadCredentials {
            aad_endpoint: self.aad_endpoint.clone(),
            tenant_id: self.tenant_id.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            audience: self.arm_audience.clone(),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Media Services REST client.
#[derive(Clone)]
pub struct MediaServicesClient {
    http: Client,
    config: MediaServicesConfig,
    account_url: String,
    token_cache: Arc<TokenCache>,
}

impl MediaServicesClient {
    pub fn new(config: MediaServicesConfig) -> TranscodeResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("mediajob-transcode/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TranscodeError::Network)?;

        let account_url = format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Media/mediaServices/{}",
            config.arm_endpoint.trim_end_matches('/'),
            config.subscription_id,
            config.resource_group,
            config.account_name
        );

        let token_cache = Arc::new(TokenCache::new(http.clone(), config.credentials()));

        Ok(Self {
            http,
            config,
            account_url,
            token_cache,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> TranscodeResult<Self> {
        Self::new(MediaServicesConfig::from_env()?)
    }

    fn asset_url(&self, name: &str) -> String {
        format!("{}/assets/{}", self.account_url, name)
    }

    fn transform_url(&self, transform_name: &str) -> String {
        format!("{}/transforms/{}", self.account_url, transform_name)
    }

    fn job_url(&self, transform_name: &str, job_name: &JobName) -> String {
        format!("{}/jobs/{}", self.transform_url(transform_name), job_name)
    }

    /// Send an authorized request, replaying it once if the token was rejected.
    async fn send<F>(&self, operation: &str, build: F) -> TranscodeResult<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let api_version = [("api-version", self.config.api_version.as_str())];

        let token = self.token_cache.get_token().await?;
        let response = build(&self.http)
            .query(&api_version)
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(operation, "Bearer token rejected, refreshing");
        record_token_retry(operation);
        self.token_cache.invalidate().await;
        let token = self.token_cache.get_token().await?;

        Ok(build(&self.http)
            .query(&api_version)
            .bearer_auth(&token)
            .send()
            .await?)
    }

    async fn execute_request<T, Fut>(&self, operation: &str, resource: &str, fut: Fut) -> TranscodeResult<T>
    where
        Fut: std::future::Future<Output = TranscodeResult<T>>,
    {
        let span = info_span!("media_services_request", operation = %operation, resource = %resource);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    /// Build an error from a non-success response, keeping the backend's code and message.
    async fn error_response(response: Response) -> TranscodeError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => {
                TranscodeError::api(status.as_u16(), envelope.error.code, envelope.error.message)
            }
            Err(_) => TranscodeError::api(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                body,
            ),
        }
    }

    /// Decode a success body; shape errors surface as `TranscodeError::Json`.
    async fn decode<T: DeserializeOwned>(response: Response) -> TranscodeResult<T> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TranscodeBackend for MediaServicesClient {
    fn transform_name(&self) -> &str {
        &self.config.transform_name
    }

    async fn ensure_transform(&self, transform_name: &str) -> TranscodeResult<()> {
        let url = self.transform_url(transform_name);

        self.execute_request("ensure_transform", transform_name, async {
            let response = self.send("get_transform", |http| http.get(&url)).await?;
            match response.status() {
                StatusCode::OK => return Ok(()),
                StatusCode::NOT_FOUND => {}
                _ => return Err(Self::error_response(response).await),
            }

            info!(transform = transform_name, "Transform missing, creating default preset");
            let body = standard_encoder_transform();
            let response = self
                .send("create_transform", |http| http.put(&url).json(&body))
                .await?;

            match response.status() {
                StatusCode::OK | StatusCode::CREATED => Ok(()),
                _ => Err(Self::error_response(response).await),
            }
        })
        .await
    }

    async fn create_asset(&self, name: &str, description: &str) -> TranscodeResult<AssetRef> {
        let url = self.asset_url(name);
        let body = AssetRequest::new(description);

        self.execute_request("create_asset", name, async {
            let response = self
                .send("create_asset", |http| http.put(&url).json(&body))
                .await?;

            match response.status() {
                StatusCode::OK | StatusCode::CREATED => {
                    let asset: AssetResource = Self::decode(response).await?;
                    Ok(asset.into_ref())
                }
                _ => Err(Self::error_response(response).await),
            }
        })
        .await
    }

    async fn create_job(
        &self,
        transform_name: &str,
        job_name: &JobName,
        input_url: &str,
        output_asset: &AssetRef,
    ) -> TranscodeResult<JobHandle> {
        // get_job and delete_job only look under the configured transform
        if transform_name != self.config.transform_name {
            return Err(TranscodeError::config_error(format!(
                "Job {} targets transform '{}' but this client tracks jobs under '{}'",
                job_name, transform_name, self.config.transform_name
            )));
        }
        let url = self.job_url(transform_name, job_name);
        let body = JobRequest::new(input_url, &output_asset.name);

        self.execute_request("create_job", job_name.as_str(), async {
            let response = self
                .send("create_job", |http| http.put(&url).json(&body))
                .await?;

            match response.status() {
                StatusCode::OK | StatusCode::CREATED => {
                    let job: JobResource = Self::decode(response).await?;
                    Ok(job.into_handle())
                }
                _ => Err(Self::error_response(response).await),
            }
        })
        .await
    }

    async fn get_job(&self, job_name: &JobName) -> TranscodeResult<Option<BackendJob>> {
        let url = self.job_url(&self.config.transform_name, job_name);

        self.execute_request("get_job", job_name.as_str(), async {
            let response = self.send("get_job", |http| http.get(&url)).await?;

            match response.status() {
                StatusCode::OK => {
                    let job: JobResource = Self::decode(response).await?;
                    Ok(Some(job.into()))
                }
                StatusCode::NOT_FOUND => Ok(None),
                _ => Err(Self::error_response(response).await),
            }
        })
        .await
    }

    async fn get_asset(&self, name: &str) -> TranscodeResult<Option<BackendAsset>> {
        let url = self.asset_url(name);

        self.execute_request("get_asset", name, async {
            let response = self.send("get_asset", |http| http.get(&url)).await?;

            match response.status() {
                StatusCode::OK => {
                    let asset: AssetResource = Self::decode(response).await?;
                    Ok(Some(asset.into_asset()?))
                }
                StatusCode::NOT_FOUND => Ok(None),
                _ => Err(Self::error_response(response).await),
            }
        })
        .await
    }

    async fn delete_asset(&self, name: &str) -> TranscodeResult<()> {
        let url = self.asset_url(name);

        self.execute_request("delete_asset", name, async {
            let response = self.send("delete_asset", |http| http.delete(&url)).await?;

            match response.status() {
                StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
                _ => Err(Self::error_response(response).await),
            }
        })
        .await
    }

    async fn delete_job(&self, job_name: &JobName) -> TranscodeResult<()> {
        let url = self.job_url(&self.config.transform_name, job_name);

        self.execute_request("delete_job", job_name.as_str(), async {
            let response = self.send("delete_job", |http| http.delete(&url)).await?;

            match response.status() {
                StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(()),
                _ => Err(Self::error_response(response).await),
            }
        })
        .await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mediajob_models::BackendJobState;
    use serde_json::json;
    use serial_test::serial;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ACCOUNT_PATH: &str =
        "/subscriptions/sub-1/resourceGroups/rg-1/providers/Microsoft.Media/mediaServices/acct";

    fn test_config(server: &MockServer) -> MediaServicesConfig {
        MediaServicesConfig {
            arm_endpoint: server.uri(),
            aad_endpoint: server.uri(),
            arm_audience: "https://management.core.windows.net/".to_string(),
            subscription_id: "sub-1".to_string(),
            resource_group: "rg-1".to_string(),
            account_name: "acct".to_string(),
            tenant_id: "tenant-1".to_string(),
            client_id: "client-1".to_string(),
            client_secret: "s3cret".to_string(),
            transform_name: "encode-720p".to_string(),
            api_version: "2022-07-01".to_string(),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        }
    }

    async fn mock_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "tok", "expires_in": "3600"})),
            )
            .mount(server)
            .await;
    }

    async fn setup() -> (MockServer, MediaServicesClient) {
        let server = MockServer::start().await;
        mock_token(&server).await;
        let client = MediaServicesClient::new(test_config(&server)).unwrap();
        (server, client)
    }

    #[tokio::test]
    async fn test_create_asset() {
        let (server, client) = setup().await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/assets/output-7-abc", ACCOUNT_PATH)))
            .and(query_param("api-version", "2022-07-01"))
            .and(header("authorization", "Bearer tok"))
            .and(body_partial_json(json!({"properties": {"description": "7-clip.mp4"}})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": "output-7-abc",
                "properties": {"container": "asset-1b2c"}
            })))
            .mount(&server)
            .await;

        let asset = client.create_asset("output-7-abc", "7-clip.mp4").await.unwrap();
        assert_eq!(asset.name, "output-7-abc");
        assert_eq!(asset.container.as_deref(), Some("asset-1b2c"));
    }

    #[tokio::test]
    async fn test_create_job_sends_input_and_output() {
        let (server, client) = setup().await;
        Mock::given(method("PUT"))
            .and(path(format!("{}/transforms/encode-720p/jobs/job-7-abc", ACCOUNT_PATH)))
            .and(body_partial_json(json!({
                "properties": {
                    "input": {"files": ["https://blob/content/7/clip.mp4?sig=x"]},
                    "outputs": [{"assetName": "output-7-abc"}]
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": "job-7-abc",
                "properties": {"state": "Queued", "outputs": []}
            })))
            .mount(&server)
            .await;

        let asset = AssetRef {
            name: "output-7-abc".to_string(),
            container: None,
        };
        let handle = client
            .create_job(
                "encode-720p",
                &JobName::from("job-7-abc"),
                "https://blob/content/7/clip.mp4?sig=x",
                &asset,
            )
            .await
            .unwrap();
        assert_eq!(handle.name.as_str(), "job-7-abc");
        assert_eq!(handle.state, BackendJobState::Queued);
    }

    #[tokio::test]
    async fn test_api_error_keeps_code_and_message() {
        let (server, client) = setup().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": "BadRequest", "message": "Transform 'x' not found"}
            })))
            .mount(&server)
            .await;

        let asset = AssetRef {
            name: "output-7-abc".to_string(),
            container: None,
        };
        let err = client
            .create_job("encode-720p", &JobName::from("job-7-abc"), "https://in", &asset)
            .await
            .unwrap_err();

        match err {
            TranscodeError::Api { status, code, message } => {
                assert_eq!(status, 400);
                assert_eq!(code, "BadRequest");
                assert_eq!(message, "Transform 'x' not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_job_under_other_transform_is_refused() {
        let (server, client) = setup().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let asset = AssetRef {
            name: "output-7-abc".to_string(),
            container: None,
        };
        let err = client
            .create_job("other", &JobName::from("job-7-abc"), "https://in", &asset)
            .await
            .unwrap_err();

        assert!(matches!(err, TranscodeError::ConfigError(_)));
        assert!(err.to_string().contains("'other'"));
    }

    #[tokio::test]
    async fn test_submitted_job_is_found_under_same_transform() {
        let (server, client) = setup().await;
        let job_path = format!("{}/transforms/encode-720p/jobs/job-7-abc", ACCOUNT_PATH);
        Mock::given(method("PUT"))
            .and(path(job_path.clone()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": "job-7-abc",
                "properties": {"state": "Queued", "outputs": []}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(job_path.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "job-7-abc",
                "properties": {
                    "state": "Processing",
                    "outputs": [{
                        "@odata.type": "#Microsoft.Media.JobOutputAsset",
                        "assetName": "output-7-abc",
                        "state": "Processing",
                        "progress": 10
                    }]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(job_path))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let name = JobName::from("job-7-abc");
        let asset = AssetRef {
            name: "output-7-abc".to_string(),
            container: None,
        };
        client
            .create_job(client.transform_name(), &name, "https://in", &asset)
            .await
            .unwrap();

        let job = client.get_job(&name).await.unwrap().unwrap();
        assert_eq!(job.state, BackendJobState::Processing);
        client.delete_job(&name).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_job_not_found() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/transforms/encode-720p/jobs/job-missing", ACCOUNT_PATH)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "NotFound", "message": "not found"}
            })))
            .mount(&server)
            .await;

        let job = client.get_job(&JobName::from("job-missing")).await.unwrap();
        assert!(job.is_none());
    }

    #[tokio::test]
    async fn test_get_job_with_error_output() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/transforms/encode-720p/jobs/job-7-abc", ACCOUNT_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "job-7-abc",
                "properties": {
                    "state": "Error",
                    "outputs": [{
                        "assetName": "output-7-abc",
                        "state": "Error",
                        "progress": 40,
                        "error": {"details": [
                            {"message": "A: bad codec"},
                            {"message": "B: timeout"}
                        ]}
                    }]
                }
            })))
            .mount(&server)
            .await;

        let job = client
            .get_job(&JobName::from("job-7-abc"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.state, BackendJobState::Error);
        assert_eq!(job.error_details_text(), "A: bad codecB: timeout");
    }

    #[tokio::test]
    async fn test_malformed_job_body() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "job-7-abc"})))
            .mount(&server)
            .await;

        let err = client.get_job(&JobName::from("job-7-abc")).await.unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn test_get_asset_resolves_container() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/assets/output-7-abc", ACCOUNT_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "output-7-abc",
                "properties": {"container": "asset-1b2c"}
            })))
            .mount(&server)
            .await;

        let asset = client.get_asset("output-7-abc").await.unwrap().unwrap();
        assert_eq!(asset.container, "asset-1b2c");
    }

    #[tokio::test]
    async fn test_deletes_tolerate_missing() {
        let (server, client) = setup().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .expect(2)
            .mount(&server)
            .await;

        client.delete_asset("output-7-abc").await.unwrap();
        client.delete_job(&JobName::from("job-7-abc")).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_failure_is_reported() {
        let (server, client) = setup().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let err = client.delete_asset("output-7-abc").await.unwrap_err();
        assert_eq!(err.http_status(), Some(503));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_rejected_token_is_refreshed_once() {
        let (server, client) = setup().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        client.delete_job(&JobName::from("job-7-abc")).await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_transform_creates_when_missing() {
        let (server, client) = setup().await;
        let transform_path = format!("{}/transforms/encode-720p", ACCOUNT_PATH);
        Mock::given(method("GET"))
            .and(path(transform_path.clone()))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(transform_path))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "encode-720p"})))
            .expect(1)
            .mount(&server)
            .await;

        client.ensure_transform("encode-720p").await.unwrap();
    }

    #[tokio::test]
    async fn test_ensure_transform_existing() {
        let (server, client) = setup().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "encode-720p"})))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        client.ensure_transform("encode-720p").await.unwrap();
    }

    #[test]
    #[serial]
    fn test_config_requires_account() {
        std::env::remove_var("SUBSCRIPTION_ID");
        let result = MediaServicesConfig::from_env();
        assert!(matches!(result, Err(TranscodeError::ConfigError(_))));
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        for (key, value) in [
            ("SUBSCRIPTION_ID", "sub-1"),
            ("RESOURCE_GROUP", "rg-1"),
            ("ACCOUNT_NAME", "acct"),
            ("AAD_TENANT_ID", "tenant-1"),
            ("AAD_CLIENT_ID", "client-1"),
            ("AAD_SECRET", "s3cret"),
            ("MEDIA_SERVICES_TRANSFORM", "encode-720p"),
        ] {
            std::env::set_var(key, value);
        }
        std::env::remove_var("ARM_ENDPOINT");
        std::env::remove_var("MEDIA_SERVICES_API_VERSION");

        let config = MediaServicesConfig::from_env().unwrap();
        assert_eq!(config.arm_endpoint, "https://management.azure.com");
        assert_eq!(config.api_version, "2022-07-01");
        assert_eq!(config.transform_name, "encode-720p");
    }
}
