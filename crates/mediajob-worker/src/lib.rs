//! Encode job orchestration.
//!
//! This crate provides:
//! - Job submission with media type checks
//! - Progress polling with the client-side `Copying` status
//! - Exactly-once finalization into durable storage
//! - The per-job orchestration loop
//! - Source ingest for new uploads

pub mod cancel;
pub mod config;
pub mod error;
pub mod finalizer;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod poller;
pub mod retry;
pub mod submitter;

#[cfg(test)]
mod testing;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use finalizer::{CleanupOutcome, FinalizeReport, Finalizer};
pub use ingest::{IngestedJob, Ingestor};
pub use logging::JobLogger;
pub use orchestrator::{JobOutcome, LoopAction, LoopState, Orchestrator};
pub use poller::ProgressPoller;
pub use retry::RetryConfig;
pub use submitter::JobSubmitter;
