//! Shared data models for the encode-job orchestrator.
//!
//! This crate provides Serde-serializable types for:
//! - Encode jobs and their identifiers
//! - Domain encode status and progress snapshots
//! - Backend-native job states
//! - Blob addressing (container + object name) and name safety rules

pub mod job;
pub mod object;
pub mod status;

pub use job::{ContentId, EncodeJob, JobName, SubmissionNames};
pub use object::{safe_blob_name, validate_container_name, ContainerNameError, ObjectRef};
pub use status::{BackendJobState, EncodeProgress, EncodeStatus};
