//! Core data types and error definitions for the processing pipeline.

use crate::{embedding::EmbeddingClientError, qdrant::QdrantError};
use std::path::PathBuf;
use thiserror::Error;

use super::loader::LoadError;

/// Errors produced while configuring the chunker.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Ingestion configured an impossible character budget.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Overlap must leave room for new text in every chunk.
    #[error("chunk overlap {chunk_overlap} must be smaller than chunk size {chunk_size}")]
    OverlapTooLarge {
        /// Configured chunk budget.
        chunk_size: usize,
        /// Configured overlap budget.
        chunk_overlap: usize,
    },
}

/// Errors emitted while processing one document or one piece of submitted content.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The document could not be read or parsed.
    #[error("Failed to load document: {0}")]
    Load(#[from] LoadError),
    /// Embedding provider failed to produce vectors for the input text.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Embedding provider returned a different number of vectors than texts sent.
    #[error("Embedding count mismatch: sent {expected} texts, received {actual} vectors")]
    EmbeddingCountMismatch {
        /// Number of texts in the batch.
        expected: usize,
        /// Number of vectors returned.
        actual: usize,
    },
    /// Returned embedding dimension does not match configuration.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected embedding dimension configured for the collection.
        expected: usize,
        /// Actual embedding dimension produced by the provider.
        actual: usize,
    },
    /// Qdrant interaction failed during collection bootstrap or upsert.
    #[error("Qdrant request failed: {0}")]
    Qdrant(#[from] QdrantError),
}

/// A bounded text window extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk text, trimmed and non-empty.
    pub text: String,
    /// Identifier of the document the chunk came from.
    pub source: String,
    /// Position among all chunks of the document; the basis of the point id.
    pub sequence_index: usize,
}

/// Counters for a successfully indexed document or text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexedStats {
    /// Points written to the collection.
    pub chunks: usize,
    /// Upsert calls issued.
    pub batches: usize,
}

/// Per-document result of a library ingestion run.
#[derive(Debug)]
pub enum DocumentOutcome {
    /// Every batch of the document was embedded and upserted.
    Indexed(IndexedStats),
    /// The document was not attempted.
    Skipped {
        /// Why the document was skipped.
        reason: SkipReason,
    },
    /// Processing stopped part-way; earlier batches may already be indexed.
    Failed {
        /// The error that stopped processing.
        error: ProcessingError,
    },
}

/// Reasons a catalog entry is skipped without being treated as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The file was absent from every library directory.
    MissingFile {
        /// Directories that were searched.
        searched: Vec<PathBuf>,
    },
}

/// Outcome for one catalog entry.
#[derive(Debug)]
pub struct DocumentReport {
    /// Catalog filename.
    pub filename: String,
    /// What happened to the document.
    pub outcome: DocumentOutcome,
}

/// Aggregated result of [`crate::processing::IngestionPipeline::ingest_library`].
#[derive(Debug, Default)]
pub struct IngestionReport {
    /// One report per catalog entry, in catalog order.
    pub documents: Vec<DocumentReport>,
    /// Whether the run had to create the target collection.
    pub collection_created: bool,
}

impl IngestionReport {
    /// Number of documents fully indexed.
    pub fn indexed(&self) -> usize {
        self.count(|outcome| matches!(outcome, DocumentOutcome::Indexed(_)))
    }

    /// Number of documents skipped.
    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, DocumentOutcome::Skipped { .. }))
    }

    /// Number of documents that failed.
    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, DocumentOutcome::Failed { .. }))
    }

    /// Total points written across all indexed documents.
    pub fn chunks_indexed(&self) -> usize {
        self.documents
            .iter()
            .map(|report| match &report.outcome {
                DocumentOutcome::Indexed(stats) => stats.chunks,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, predicate: impl Fn(&DocumentOutcome) -> bool) -> usize {
        self.documents
            .iter()
            .filter(|report| predicate(&report.outcome))
            .count()
    }
}
