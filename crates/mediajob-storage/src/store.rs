//! Blob store abstraction.
//!
//! The orchestrator only talks to storage through [`BlobStore`], so any
//! implementation must be safe to share between concurrently running jobs.

use async_trait::async_trait;
use tokio::io::AsyncRead;

use mediajob_models::ObjectRef;

use crate::error::StorageResult;

/// `allowed_ip` value that places no restriction on the reader.
pub const ANY_SOURCE_IP: &str = "*";

/// Streamed upload body.
pub type BlobReader = Box<dyn AsyncRead + Send + Unpin>;

/// Information about a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Object address
    pub object: ObjectRef,
    /// Size in bytes
    pub size: u64,
    /// Last modified timestamp (milliseconds since epoch)
    pub last_modified: Option<u64>,
}

/// Addressable binary objects organised into named containers.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Check if an object exists.
    async fn exists(&self, object: &ObjectRef) -> StorageResult<bool>;

    /// Size of an existing object in bytes.
    ///
    /// Fails with `StorageError::NotFound` when the object is missing.
    async fn size(&self, object: &ObjectRef) -> StorageResult<u64>;

    /// Upload everything `reader` yields. Returns the number of bytes stored.
    async fn upload_stream(
        &self,
        object: &ObjectRef,
        reader: BlobReader,
        content_type: &str,
    ) -> StorageResult<u64>;

    /// Replace the object's content with `text`.
    async fn upload_text(&self, object: &ObjectRef, text: &str) -> StorageResult<()>;

    /// Server-side copy of `source` onto `dest`.
    ///
    /// Readers of `dest` see either the previous object or the complete copy.
    /// Returns `false` when the store accepted the request but the copy did
    /// not complete.
    async fn copy(&self, source: &ObjectRef, dest: &ObjectRef) -> StorageResult<bool>;

    /// Time-limited read URL. `allowed_ip` of `"*"` means any client.
    async fn read_url(&self, object: &ObjectRef, allowed_ip: &str) -> StorageResult<String>;

    /// Time-limited write URL.
    async fn write_url(&self, object: &ObjectRef) -> StorageResult<String>;

    async fn set_content_disposition(&self, object: &ObjectRef, value: &str) -> StorageResult<()>;

    /// List objects in `container` whose names start with `prefix`.
    async fn list(&self, container: &str, prefix: &str) -> StorageResult<Vec<ObjectInfo>>;
}
