//! S3-compatible blob store client.
//!
//! Containers map to buckets and object names to keys.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::operation::head_object::HeadObjectOutput;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::MetadataDirective;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use mediajob_models::ObjectRef;

use crate::error::{StorageError, StorageResult};
use crate::store::{BlobReader, BlobStore, ObjectInfo, ANY_SOURCE_IP};
use crate::upload::upload_reader;

/// Configuration for the S3 client.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Region ("auto" for most S3-compatible services)
    pub region: String,
    /// Lifetime of generated read/write URLs
    pub url_expiry: Duration,
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("S3_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("S3_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("S3_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("S3_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("S3_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("S3_SECRET_ACCESS_KEY not set"))?,
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "auto".to_string()),
            url_expiry: Duration::from_secs(
                std::env::var("SAS_EXPIRY_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
        })
    }
}

/// Blob store backed by an S3-compatible service.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    url_expiry: Duration,
}

impl S3BlobStore {
    /// Create a new client from configuration.
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "mediajob",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        info!("Configured S3 blob store at {}", config.endpoint_url);

        Ok(Self {
            client: Client::from_conf(sdk_config),
            url_expiry: config.url_expiry,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = StorageConfig::from_env()?;
        Self::new(config).await
    }

    async fn head(&self, object: &ObjectRef) -> StorageResult<Option<HeadObjectOutput>> {
        match self
            .client
            .head_object()
            .bucket(&object.container)
            .key(&object.name)
            .send()
            .await
        {
            Ok(output) => Ok(Some(output)),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(None),
            Err(e) => Err(StorageError::metadata_failed(format!("{}: {}", object, e))),
        }
    }

    fn presigning_config(&self) -> StorageResult<PresigningConfig> {
        PresigningConfig::expires_in(self.url_expiry)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))
    }
}

/// `x-amz-copy-source` value for an object.
fn copy_source(object: &ObjectRef) -> String {
    let key = urlencoding::encode(&object.name).replace("%2F", "/");
    format!("{}/{}", object.container, key)
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn exists(&self, object: &ObjectRef) -> StorageResult<bool> {
        Ok(self.head(object).await?.is_some())
    }

    async fn size(&self, object: &ObjectRef) -> StorageResult<u64> {
        let head = self
            .head(object)
            .await?
            .ok_or_else(|| StorageError::not_found(object.to_string()))?;
        Ok(head.content_length().unwrap_or(0).max(0) as u64)
    }

    async fn upload_stream(
        &self,
        object: &ObjectRef,
        mut reader: BlobReader,
        content_type: &str,
    ) -> StorageResult<u64> {
        let bytes = upload_reader(
            &self.client,
            &object.container,
            &object.name,
            &mut reader,
            content_type,
        )
        .await?;

        info!("Uploaded {} bytes to {}", bytes, object);
        Ok(bytes)
    }

    async fn upload_text(&self, object: &ObjectRef, text: &str) -> StorageResult<()> {
        debug!("Uploading {} characters of text to {}", text.len(), object);

        self.client
            .put_object()
            .bucket(&object.container)
            .key(&object.name)
            .body(ByteStream::from(text.as_bytes().to_vec()))
            .content_type("text/plain; charset=utf-8")
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(format!("{}: {}", object, e)))?;

        Ok(())
    }

    async fn copy(&self, source: &ObjectRef, dest: &ObjectRef) -> StorageResult<bool> {
        debug!("Copying {} to {}", source, dest);

        let output = self
            .client
            .copy_object()
            .bucket(&dest.container)
            .key(&dest.name)
            .copy_source(copy_source(source))
            .send()
            .await
            .map_err(|e| match e.as_service_error().and_then(|se| se.code()) {
                Some("NoSuchKey") | Some("NoSuchBucket") => StorageError::not_found(source.to_string()),
                _ => StorageError::copy_failed(format!("{} -> {}: {}", source, dest, e)),
            })?;

        let completed = output.copy_object_result().is_some();
        if completed {
            info!("Copied {} to {}", source, dest);
        }
        Ok(completed)
    }

    async fn read_url(&self, object: &ObjectRef, allowed_ip: &str) -> StorageResult<String> {
        if allowed_ip != ANY_SOURCE_IP {
            // Presigned S3 URLs cannot be bound to a client address.
            debug!(allowed_ip, "Issuing unrestricted read URL for {}", object);
        }

        let presigned = self
            .client
            .get_object()
            .bucket(&object.container)
            .key(&object.name)
            .presigned(self.presigning_config()?)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    async fn write_url(&self, object: &ObjectRef) -> StorageResult<String> {
        let presigned = self
            .client
            .put_object()
            .bucket(&object.container)
            .key(&object.name)
            .presigned(self.presigning_config()?)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    async fn set_content_disposition(&self, object: &ObjectRef, value: &str) -> StorageResult<()> {
        let head = self
            .head(object)
            .await?
            .ok_or_else(|| StorageError::not_found(object.to_string()))?;

        // S3 metadata is immutable; rewrite the object onto itself.
        let mut request = self
            .client
            .copy_object()
            .bucket(&object.container)
            .key(&object.name)
            .copy_source(copy_source(object))
            .metadata_directive(MetadataDirective::Replace)
            .content_disposition(value)
            .set_metadata(head.metadata().cloned());

        if let Some(content_type) = head.content_type() {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map_err(|e| StorageError::metadata_failed(format!("{}: {}", object, e)))?;

        Ok(())
    }

    async fn list(&self, container: &str, prefix: &str) -> StorageResult<Vec<ObjectInfo>> {
        debug!("Listing {} with prefix: {}", container, prefix);

        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(container)
                .prefix(prefix);

            if let Some(token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;

            for obj in response.contents() {
                objects.push(ObjectInfo {
                    object: ObjectRef::new(container, obj.key().unwrap_or_default()),
                    size: obj.size().unwrap_or(0).max(0) as u64,
                    last_modified: obj
                        .last_modified()
                        .and_then(|t| t.to_millis().ok())
                        .map(|ms| ms as u64),
                });
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(str::to_string);
            } else {
                break;
            }
        }

        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_source_keeps_path_separators() {
        let object = ObjectRef::new("asset-1b2c", "7/my clip.mp4");
        assert_eq!(copy_source(&object), "asset-1b2c/7/my%20clip.mp4");
    }

    #[tokio::test]
    async fn test_new_client_from_config() {
        let store = S3BlobStore::new(StorageConfig {
            endpoint_url: "http://localhost:9000".to_string(),
            access_key_id: "minio".to_string(),
            secret_access_key: "minio123".to_string(),
            region: "auto".to_string(),
            url_expiry: Duration::from_secs(60),
        })
        .await;
        assert!(store.is_ok());
    }

    #[tokio::test]
    async fn test_read_url_is_presigned_locally() {
        let store = S3BlobStore::new(StorageConfig {
            endpoint_url: "http://localhost:9000".to_string(),
            access_key_id: "minio".to_string(),
            secret_access_key: "minio123".to_string(),
            region: "auto".to_string(),
            url_expiry: Duration::from_secs(60),
        })
        .await
        .unwrap();

        let url = store
            .read_url(&ObjectRef::new("content", "7/clip.mp4"), ANY_SOURCE_IP)
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:9000/content/7/clip.mp4?"));
        assert!(url.contains("X-Amz-Expires=60"));
    }
}
