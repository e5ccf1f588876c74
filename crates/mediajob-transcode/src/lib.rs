//! Transcoding backend client.
//!
//! This crate provides:
//! - The `TranscodeBackend` trait consumed by the orchestrator
//! - Backend job/asset snapshots with error-detail extraction
//! - A Media Services v3 REST client with cached client-credential tokens
//! - The default H.264/AAC encoding transform

pub mod backend;
pub mod client;
pub mod error;
pub mod metrics;
pub mod token_cache;
pub mod transform;
mod wire;

pub use backend::{
    AssetRef, BackendAsset, BackendJob, JobErrorDetail, JobHandle, JobOutput, JobOutputError,
    TranscodeBackend,
};
pub use client::{MediaServicesClient, MediaServicesConfig};
pub use token_cache::{AadCredentials, TokenCache};
pub use transform::standard_encoder_transform;
pub use error::{TranscodeError, TranscodeResult};
