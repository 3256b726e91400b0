//! Document processing pipeline: loading, chunking, embedding, and Qdrant orchestration.

pub mod chunking;
#[cfg(test)]
pub(crate) mod fakes;
pub mod loader;
pub mod pipeline;
pub mod task;
pub mod types;

pub use chunking::Chunker;
pub use loader::{DocumentLoader, LibraryLoader, LoadError, resolve_document_path};
pub use pipeline::{DEFAULT_BATCH_SIZE, IngestionPipeline, PipelineSettings};
pub use task::{IngestionTaskProcessor, Task, TaskError, TaskProcessor, UNKNOWN_FIELD};
pub use types::{
    Chunk, ChunkingError, DocumentOutcome, DocumentReport, IndexedStats, IngestionReport,
    ProcessingError, SkipReason,
};
