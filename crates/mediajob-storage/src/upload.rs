//! Streamed multipart upload.
//!
//! Source media can be large, so uploads are read in fixed-size parts and
//! never held in memory as a whole. Inputs smaller than one part go out as a
//! single `PutObject`.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};

/// Part size for multipart uploads. S3 rejects non-final parts under 5 MiB.
pub const PART_SIZE: usize = 8 * 1024 * 1024;

/// Read until `buf` is full or the reader is exhausted.
///
/// Returns the number of bytes placed in `buf`; less than `buf.len()` means EOF.
pub async fn fill_part<R>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// An in-progress multipart upload.
struct MultipartUpload<'a> {
    client: &'a Client,
    bucket: &'a str,
    key: &'a str,
    upload_id: String,
    parts: Vec<CompletedPart>,
}

impl<'a> MultipartUpload<'a> {
    async fn begin(
        client: &'a Client,
        bucket: &'a str,
        key: &'a str,
        content_type: &str,
    ) -> StorageResult<Self> {
        let output = client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(format!("Failed to initiate upload: {}", e)))?;

        let upload_id = output
            .upload_id()
            .ok_or_else(|| StorageError::upload_failed("Missing upload id"))?
            .to_string();

        Ok(Self {
            client,
            bucket,
            key,
            upload_id,
            parts: Vec::new(),
        })
    }

    async fn upload_part(&mut self, body: Bytes) -> StorageResult<()> {
        let part_number = self.parts.len() as i32 + 1;

        let output = self
            .client
            .upload_part()
            .bucket(self.bucket)
            .key(self.key)
            .upload_id(&self.upload_id)
            .part_number(part_number)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                StorageError::upload_failed(format!("Failed to upload part {}: {}", part_number, e))
            })?;

        let e_tag = output
            .e_tag()
            .ok_or_else(|| StorageError::upload_failed(format!("Part {} has no ETag", part_number)))?;

        self.parts.push(
            CompletedPart::builder()
                .e_tag(e_tag)
                .part_number(part_number)
                .build(),
        );
        Ok(())
    }

    async fn complete(self) -> StorageResult<()> {
        let completed = CompletedMultipartUpload::builder()
            .set_parts(Some(self.parts))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(self.bucket)
            .key(self.key)
            .upload_id(&self.upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(format!("Failed to complete upload: {}", e)))?;

        Ok(())
    }

    async fn abort(self) {
        if let Err(e) = self
            .client
            .abort_multipart_upload()
            .bucket(self.bucket)
            .key(self.key)
            .upload_id(&self.upload_id)
            .send()
            .await
        {
            warn!(key = %self.key, "Failed to abort multipart upload: {}", e);
        }
    }
}

/// Upload everything `reader` yields to `bucket/key`.
pub(crate) async fn upload_reader<R>(
    client: &Client,
    bucket: &str,
    key: &str,
    reader: &mut R,
    content_type: &str,
) -> StorageResult<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = vec![0u8; PART_SIZE];
    let mut filled = fill_part(reader, &mut buf).await?;

    if filled < PART_SIZE {
        debug!("Uploading {} bytes to {}/{} in one request", filled, bucket, key);
        client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(Bytes::copy_from_slice(&buf[..filled])))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;
        return Ok(filled as u64);
    }

    let mut upload = MultipartUpload::begin(client, bucket, key, content_type).await?;
    let mut total = 0u64;

    while filled > 0 {
        if let Err(e) = upload.upload_part(Bytes::copy_from_slice(&buf[..filled])).await {
            upload.abort().await;
            return Err(e);
        }
        total += filled as u64;

        if filled < PART_SIZE {
            break;
        }

        filled = match fill_part(reader, &mut buf).await {
            Ok(n) => n,
            Err(e) => {
                upload.abort().await;
                return Err(e.into());
            }
        };
    }

    debug!("Completing {}-part upload to {}/{}", upload.parts.len(), bucket, key);
    upload.complete().await?;
    Ok(total)
}
