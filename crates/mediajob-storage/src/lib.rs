//! Blob storage for encode inputs and outputs.
//!
//! This crate provides:
//! - The `BlobStore` trait consumed by the orchestrator
//! - An S3-compatible implementation (server-side copy, presigned URLs)
//! - Streamed multipart upload
//! - Content and named container addressing

pub mod client;
pub mod container;
pub mod error;
pub mod store;
pub mod upload;

pub use client::{S3BlobStore, StorageConfig};
pub use container::{ContentContainer, NamedContainer};
pub use error::{StorageError, StorageResult};
pub use store::{BlobReader, BlobStore, ObjectInfo, ANY_SOURCE_IP};
