//! Container addressing.
//!
//! Content items share one durable container and are separated by a
//! `{content_id}/` prefix. Backend output assets each get their own container.

use mediajob_models::{safe_blob_name, validate_container_name, ContentId, ObjectRef};

use crate::error::{StorageError, StorageResult};
use crate::store::BlobStore;

/// Durable, caller-owned storage for one content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentContainer {
    container: String,
    content_id: ContentId,
}

impl ContentContainer {
    pub fn new(container: impl Into<String>, content_id: ContentId) -> Self {
        Self {
            container: container.into(),
            content_id,
        }
    }

    pub fn content_id(&self) -> ContentId {
        self.content_id
    }

    /// Address of `filename` within this content item.
    pub fn blob(&self, filename: &str) -> ObjectRef {
        ObjectRef::new(
            &self.container,
            format!("{}/{}", self.content_id, safe_blob_name(filename)),
        )
    }

    /// Every object stored for this content item.
    pub async fn list_blobs(&self, store: &dyn BlobStore) -> StorageResult<Vec<ObjectRef>> {
        let prefix = format!("{}/", self.content_id);
        let objects = store.list(&self.container, &prefix).await?;
        Ok(objects.into_iter().map(|info| info.object).collect())
    }
}

/// A container addressed by its raw name, e.g. a backend output asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedContainer {
    name: String,
}

impl NamedContainer {
    /// Validate `name` against container naming rules.
    pub fn new(name: impl Into<String>) -> StorageResult<Self> {
        let name = name.into();
        validate_container_name(&name).map_err(|e| StorageError::InvalidKey(e.to_string()))?;
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blob(&self, filename: &str) -> ObjectRef {
        ObjectRef::new(&self.name, safe_blob_name(filename))
    }
}
