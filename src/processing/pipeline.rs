//! Library ingestion: catalog entry → pages → chunks → embeddings → Qdrant points.

use crate::{
    catalog::{CatalogEntry, MetadataCatalog},
    config::Config,
    embedding::{EmbeddingClient, OpenAiEmbeddingClient},
    metrics::{IngestionMetrics, IngestionSnapshot},
    processing::{
        chunking::Chunker,
        loader::{DocumentLoader, LibraryLoader, resolve_document_path},
        types::{
            Chunk, DocumentOutcome, DocumentReport, IndexedStats, IngestionReport,
            ProcessingError, SkipReason,
        },
    },
    qdrant::{
        self, IndexPoint, QdrantService, VectorIndex, VectorParams, book_payload_base,
        clean_chunk_text, derive_point_id, with_page_content,
    },
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Number of chunks embedded and upserted per request.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Targets and limits for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Collection receiving library documents.
    pub collection: String,
    /// Dimension every embedding must have; also the collection's vector size.
    pub dimension: usize,
    /// Chunks per embedding call and per upsert.
    pub batch_size: usize,
    /// Directories searched, in order, for catalog files.
    pub library_dirs: Vec<PathBuf>,
}

impl PipelineSettings {
    /// Derive settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            collection: config.collection_wisdom.clone(),
            dimension: config.embedding_dimension,
            batch_size: DEFAULT_BATCH_SIZE,
            library_dirs: config.library_dirs.clone(),
        }
    }
}

/// Orchestrates loading, chunking, embedding, and indexing of catalog documents.
///
/// Every external call is awaited in turn; batches of one document are never in flight
/// together. Point ids depend only on `(document, sequence_index)`, so runs can be repeated.
pub struct IngestionPipeline {
    embedding_client: Arc<dyn EmbeddingClient + Send + Sync>,
    vector_index: Arc<dyn VectorIndex>,
    loader: Arc<dyn DocumentLoader>,
    catalog: MetadataCatalog,
    chunker: Chunker,
    settings: PipelineSettings,
    metrics: Arc<IngestionMetrics>,
}

impl IngestionPipeline {
    /// Assemble a pipeline from explicit collaborators.
    pub fn new(
        embedding_client: Arc<dyn EmbeddingClient + Send + Sync>,
        vector_index: Arc<dyn VectorIndex>,
        loader: Arc<dyn DocumentLoader>,
        catalog: MetadataCatalog,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            embedding_client,
            vector_index,
            loader,
            catalog,
            chunker: Chunker::default(),
            settings,
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    /// Build the production pipeline: OpenAI embeddings, Qdrant over HTTP, on-disk library.
    pub fn from_config(config: &Config, catalog: MetadataCatalog) -> Result<Self, ProcessingError> {
        tracing::info!(
            model = %config.embedding_model,
            dimension = config.embedding_dimension,
            "Initializing embedding client"
        );
        let embedding_client = OpenAiEmbeddingClient::new(config)?;
        let qdrant = QdrantService::new(config)?;
        tracing::debug!(qdrant = %config.qdrant_url, "Qdrant client ready");
        Ok(Self::new(
            Arc::new(embedding_client),
            Arc::new(qdrant),
            Arc::new(LibraryLoader),
            catalog,
            PipelineSettings::from_config(config),
        ))
    }

    /// Catalog driving [`Self::ingest_library`].
    pub fn catalog(&self) -> &MetadataCatalog {
        &self.catalog
    }

    /// Active settings.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Counters accumulated since construction.
    pub fn metrics_snapshot(&self) -> IngestionSnapshot {
        self.metrics.snapshot()
    }

    /// Create `collection` with cosine vectors of the configured dimension if it is missing.
    ///
    /// Returns `true` when the collection had to be created.
    pub async fn ensure_collection(&self, collection: &str) -> Result<bool, ProcessingError> {
        let params = VectorParams::cosine(self.settings.dimension as u64);
        let created = qdrant::ensure_collection(self.vector_index.as_ref(), collection, params).await?;
        Ok(created)
    }

    /// Ingest every catalog document into the library collection.
    ///
    /// Only a failed collection bootstrap is returned as an error. Problems with individual
    /// documents are recorded in the report and the run moves on.
    pub async fn ingest_library(&self) -> Result<IngestionReport, ProcessingError> {
        let collection = self.settings.collection.as_str();
        tracing::info!(
            collection,
            documents = self.catalog.len(),
            "Starting library ingestion"
        );
        let collection_created = self.ensure_collection(collection).await?;

        let mut documents = Vec::with_capacity(self.catalog.len());
        for entry in self.catalog.entries() {
            let outcome = self.ingest_document(entry).await;
            documents.push(DocumentReport {
                filename: entry.filename.clone(),
                outcome,
            });
        }

        let report = IngestionReport {
            documents,
            collection_created,
        };
        tracing::info!(
            collection,
            indexed = report.indexed(),
            skipped = report.skipped(),
            failed = report.failed(),
            chunks = report.chunks_indexed(),
            "Library ingestion finished"
        );
        Ok(report)
    }

    /// Index one catalog document into the library collection.
    ///
    /// The collection is assumed to exist. Never returns an error: the outcome says what
    /// happened, and batches upserted before a failure stay in the index.
    pub async fn ingest_document(&self, entry: &CatalogEntry) -> DocumentOutcome {
        let filename = entry.filename.as_str();
        let Some(path) = resolve_document_path(&self.settings.library_dirs, filename) else {
            tracing::warn!(
                file = filename,
                searched = ?self.settings.library_dirs,
                "Document not found in any library directory; skipping"
            );
            self.metrics.record_skipped();
            return DocumentOutcome::Skipped {
                reason: SkipReason::MissingFile {
                    searched: self.settings.library_dirs.clone(),
                },
            };
        };

        tracing::info!(file = filename, path = %path.display(), "Processing document");
        match self.index_document(entry, &path).await {
            Ok(stats) => {
                self.metrics.record_indexed();
                tracing::info!(
                    file = filename,
                    chunks = stats.chunks,
                    batches = stats.batches,
                    "Document indexed"
                );
                DocumentOutcome::Indexed(stats)
            }
            Err(error) => {
                self.metrics.record_failed();
                tracing::error!(file = filename, error = %error, "Document ingestion failed");
                DocumentOutcome::Failed { error }
            }
        }
    }

    /// Chunk and index free text into `collection`.
    ///
    /// Every point carries `payload_base` plus its `page_content`; ids derive from `id_scope`
    /// and the chunk position. The collection is assumed to exist.
    pub async fn ingest_text(
        &self,
        collection: &str,
        text: &str,
        payload_base: &Map<String, Value>,
        id_scope: &str,
    ) -> Result<IndexedStats, ProcessingError> {
        let chunks = self.chunker.split_pages(id_scope, &[text]);
        tracing::debug!(
            collection,
            scope = id_scope,
            chunks = chunks.len(),
            "Chunked submitted text"
        );
        self.index_chunks(collection, chunks, payload_base).await
    }

    async fn index_document(
        &self,
        entry: &CatalogEntry,
        path: &Path,
    ) -> Result<IndexedStats, ProcessingError> {
        let pages = self.loader.load_pages(path).await?;
        let chunks = self.chunker.split_pages(&entry.filename, &pages);
        tracing::debug!(
            file = %entry.filename,
            pages = pages.len(),
            chunks = chunks.len(),
            "Chunked document"
        );
        let payload_base = book_payload_base(&entry.metadata);
        self.index_chunks(&self.settings.collection, chunks, &payload_base)
            .await
    }

    async fn index_chunks(
        &self,
        collection: &str,
        chunks: Vec<Chunk>,
        payload_base: &Map<String, Value>,
    ) -> Result<IndexedStats, ProcessingError> {
        // Dropped chunks keep their sequence index out of use so ids stay stable.
        let cleaned: Vec<Chunk> = chunks
            .into_iter()
            .filter_map(|chunk| {
                let text = clean_chunk_text(&chunk.text);
                if text.is_empty() {
                    tracing::debug!(
                        source = %chunk.source,
                        sequence_index = chunk.sequence_index,
                        "Dropping chunk that is empty after cleaning"
                    );
                    return None;
                }
                Some(Chunk { text, ..chunk })
            })
            .collect();

        let batch_size = self.settings.batch_size.max(1);
        let total_batches = cleaned.len().div_ceil(batch_size);
        let mut stats = IndexedStats::default();

        for (batch_number, batch) in cleaned.chunks(batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
            let vectors = self.embedding_client.generate_embeddings(texts).await?;
            self.check_vectors(batch.len(), &vectors)?;

            let points: Vec<IndexPoint> = batch
                .iter()
                .zip(vectors)
                .map(|(chunk, vector)| IndexPoint {
                    id: derive_point_id(&chunk.source, chunk.sequence_index),
                    vector,
                    payload: with_page_content(payload_base, &chunk.text),
                })
                .collect();
            self.vector_index.upsert_points(collection, points).await?;

            self.metrics.record_batch(batch.len() as u64);
            stats.chunks += batch.len();
            stats.batches += 1;
            tracing::debug!(
                collection,
                batch = batch_number + 1,
                total_batches,
                points = batch.len(),
                "Batch upserted"
            );
        }

        Ok(stats)
    }

    fn check_vectors(&self, expected: usize, vectors: &[Vec<f32>]) -> Result<(), ProcessingError> {
        if vectors.len() != expected {
            return Err(ProcessingError::EmbeddingCountMismatch {
                expected,
                actual: vectors.len(),
            });
        }
        let dimension = self.settings.dimension;
        if let Some(vector) = vectors.iter().find(|vector| vector.len() != dimension) {
            return Err(ProcessingError::DimensionMismatch {
                expected: dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}
