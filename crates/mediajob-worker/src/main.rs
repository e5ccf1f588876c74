//! Encode a local video file end to end.
//!
//! Usage: `mediajob-worker <file> [content-id]`

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mediajob_models::{ContentId, EncodeStatus};
use mediajob_storage::{BlobStore, S3BlobStore};
use mediajob_transcode::{MediaServicesClient, TranscodeBackend};
use mediajob_worker::{Ingestor, JobOutcome, Orchestrator, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("Failed to install rustls crypto provider");
        std::process::exit(1);
    }

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let metrics = match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    };

    let mut args = std::env::args().skip(1);
    let Some(file) = args.next() else {
        eprintln!("usage: mediajob-worker <file> [content-id]");
        std::process::exit(2);
    };
    let content_id = match args.next().map(|s| s.parse::<u64>()).transpose() {
        Ok(id) => ContentId(id.unwrap_or(0)),
        Err(e) => {
            eprintln!("invalid content id: {}", e);
            std::process::exit(2);
        }
    };

    let result = run(&file, content_id).await;

    if let Some(handle) = metrics {
        info!("Metrics:\n{}", handle.render());
    }

    match result {
        Ok(JobOutcome::Finished { .. }) => {}
        Ok(outcome) => {
            error!("Encode did not finish: {:?}", outcome);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Encode failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mediajob=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run(file: &str, content_id: ContentId) -> anyhow::Result<JobOutcome> {
    let store: Arc<dyn BlobStore> = Arc::new(
        S3BlobStore::from_env()
            .await
            .context("Failed to create blob store")?,
    );
    let client = MediaServicesClient::from_env().context("Failed to create Media Services client")?;

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    client
        .ensure_transform(client.transform_name())
        .await
        .context("Failed to prepare transform")?;
    let backend: Arc<dyn TranscodeBackend> = Arc::new(client);
    let config = Arc::new(config);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            on_signal.cancel();
        }
    });

    let source = tokio::fs::File::open(file)
        .await
        .with_context(|| format!("Failed to open {}", file))?;

    let ingested = Ingestor::new(store.clone(), backend.clone(), config.clone())
        .ingest(file, Box::new(source), content_id, &cancel)
        .await?;
    info!(
        job_name = %ingested.job.job_name,
        "Submitted job: {}",
        serde_json::to_string(&ingested.job)?
    );

    let read_url = store
        .read_url(&ingested.destination, mediajob_storage::ANY_SOURCE_IP)
        .await?;

    let orchestrator = Orchestrator::from_config(store, backend, &config);
    let outcome = orchestrator
        .run_with_progress(&ingested.job, &cancel, |progress| {
            if progress.status == EncodeStatus::Processing {
                println!("{:>5.1}%", progress.progress_percentage);
            } else {
                println!("{}", progress.status);
            }
        })
        .await?;

    if outcome.is_success() {
        println!("Encoded file available at {}", read_url);
    }
    Ok(outcome)
}
