//! Source ingest.
//!
//! Stores an uploaded source in the content container, creates the empty
//! destination the poller watches, and submits the encode job.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use mediajob_models::{ContentId, EncodeJob, ObjectRef};
use mediajob_storage::{BlobReader, BlobStore, ContentContainer};
use mediajob_transcode::TranscodeBackend;

use crate::cancel::cancellable;
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::submitter::JobSubmitter;

/// A submitted job together with the objects ingest created for it.
#[derive(Debug, Clone)]
pub struct IngestedJob {
    pub job: EncodeJob,
    /// Stored copy of the source, `{guid}_original{ext}`
    pub original: ObjectRef,
    /// Encoded destination, `{guid}{encoded ext}`; empty until finalized
    pub destination: ObjectRef,
}

pub struct Ingestor {
    store: Arc<dyn BlobStore>,
    submitter: JobSubmitter,
    config: Arc<WorkerConfig>,
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn BlobStore>,
        backend: Arc<dyn TranscodeBackend>,
        config: Arc<WorkerConfig>,
    ) -> Self {
        Self {
            submitter: JobSubmitter::new(store.clone(), backend, config.clone()),
            store,
            config,
        }
    }

    /// Upload `reader` as the source for `content_id` and submit it.
    ///
    /// `original_name` is the name the user uploaded; the encoded object is
    /// served under it through its Content-Disposition.
    pub async fn ingest(
        &self,
        original_name: &str,
        reader: BlobReader,
        content_id: ContentId,
        cancel: &CancellationToken,
    ) -> WorkerResult<IngestedJob> {
        let file_name = Path::new(original_name)
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                WorkerError::unsupported_media_type(format!("{} (no file name)", original_name))
            })?;
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();

        let guid = Uuid::new_v4().simple().to_string();
        let container = ContentContainer::new(&self.config.content_container, content_id);
        let original = container.blob(&format!("{}_original{}", guid, extension));
        let target_file_name = format!("{}{}", guid, self.config.encoded_file_extension);
        let destination = container.blob(&target_file_name);

        // Reject before anything is stored
        self.submitter.check_media_type(&original)?;

        let bytes = cancellable(
            cancel,
            "upload_source",
            self.store
                .upload_stream(&original, reader, content_type_for(&extension)),
        )
        .await?;
        info!(content_id = %content_id, bytes, "Uploaded source to {}", original);

        cancellable(
            cancel,
            "create_destination",
            self.store.upload_text(&destination, ""),
        )
        .await?;

        let job = self
            .submitter
            .submit(&original, &target_file_name, content_id, cancel)
            .await?;

        let disposition = format!("filename=\"{}\"", urlencoding::encode(file_name));
        cancellable(
            cancel,
            "set_content_disposition",
            self.store.set_content_disposition(&destination, &disposition),
        )
        .await?;

        Ok(IngestedJob {
            job,
            original,
            destination,
        })
    }
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        ".mp4" | ".m4a" => "video/mp4",
        ".mov" => "video/quicktime",
        ".avi" => "video/x-msvideo",
        ".wmv" | ".asf" => "video/x-ms-wmv",
        ".mpeg" | ".mpg" | ".m2v" => "video/mpeg",
        ".ts" | ".mts" | ".m2ts" => "video/mp2t",
        ".3gp" => "video/3gpp",
        ".3g2" | ".3gp2" => "video/3gpp2",
        _ => "application/octet-stream",
    }
}
