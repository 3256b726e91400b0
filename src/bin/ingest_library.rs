//! One-shot library ingestion.
//!
//! Indexes every catalog document into the library collection, then prints a per-document
//! summary. Re-running overwrites the same points.
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use wisdom_ingest::{
    catalog::MetadataCatalog,
    config, logging,
    processing::{DocumentOutcome, IngestionPipeline, SkipReason},
};

#[derive(Parser)]
#[command(
    name = "ingest-library",
    about = "Chunk, embed, and index the book library into Qdrant"
)]
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
    logging::init_tracing("ingest-library");
    config.apply_overrides(cli.catalog, cli.library_dir);
    config.log_summary();

    let catalog = MetadataCatalog::load(config.catalog_path.as_deref())
        .context("failed to load library catalog")?;
    let pipeline = IngestionPipeline::from_config(&config, catalog)
        .context("failed to initialize ingestion pipeline")?;

    let report = pipeline
        .ingest_library()
        .await
        .context("library ingestion aborted")?;

    for document in &report.documents {
        match &document.outcome {
            DocumentOutcome::Indexed(stats) => {
                println!(
                    "indexed  {} ({} chunks, {} batches)",
                    document.filename, stats.chunks, stats.batches
                );
            }
            DocumentOutcome::Skipped {
                reason: SkipReason::MissingFile { searched },
            } => {
                let searched: Vec<String> = searched
                    .iter()
                    .map(|dir| dir.display().to_string())
                    .collect();
                println!(
                    "skipped  {} (not found in {})",
                    document.filename,
                    searched.join(", ")
                );
            }
            DocumentOutcome::Failed { error } => {
                println!("failed   {} ({error})", document.filename);
            }
        }
    }
    println!(
        "{} indexed, {} skipped, {} failed, {} chunks",
        report.indexed(),
        report.skipped(),
        report.failed(),
        report.chunks_indexed()
    );
    Ok(())
}
