//! Queue worker entrypoint.
//!
//! Pops tasks from the Redis ingestion queue and indexes them until Ctrl-C.
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wisdom_ingest::{
    catalog::MetadataCatalog,
    config, logging,
    processing::{IngestionPipeline, IngestionTaskProcessor},
    queue::{QueueConsumer, RedisQueue},
};

#[derive(Parser)]
#[command(name = "wisdom-ingest", about = "Consume ingestion tasks from the queue")]
struct Cli {
    /// JSON catalog to use instead of the built-in one.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Single library directory replacing the default search path.
    #[arg(long)]
    library_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = config::load_config().context("failed to load configuration")?;
    logging::init_tracing("wisdom-ingest");
    config.apply_overrides(cli.catalog, cli.library_dir);
    config.log_summary();

    let catalog = MetadataCatalog::load(config.catalog_path.as_deref())
        .context("failed to load library catalog")?;
    let pipeline = Arc::new(
        IngestionPipeline::from_config(&config, catalog)
            .context("failed to initialize ingestion pipeline")?,
    );
    let processor = IngestionTaskProcessor::new(Arc::clone(&pipeline), config.collection_wire.clone());
    let queue = RedisQueue::connect(&config.redis_url, config.queue_name.clone())
        .await
        .context("failed to connect to the task queue")?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown requested");
                    cancel.cancel();
                }
                Err(err) => tracing::warn!(error = %err, "Unable to listen for Ctrl-C"),
            }
        }
    });

    tracing::info!(queue = %config.queue_name, "Worker started");
    let mut consumer = QueueConsumer::new(queue, processor);
    consumer
        .run(cancel)
        .await
        .context("task queue became unavailable")?;

    let snapshot = pipeline.metrics_snapshot();
    tracing::info!(
        documents = snapshot.documents_indexed,
        chunks = snapshot.chunks_indexed,
        batches = snapshot.batches_upserted,
        "Worker exited"
    );
    Ok(())
}
