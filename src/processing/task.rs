//! Queue task model and the processor that turns a task into indexed points.

use crate::processing::{
    pipeline::IngestionPipeline,
    types::{DocumentOutcome, ProcessingError},
};
use crate::qdrant::wire_payload_base;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Placeholder used when a message omits `user_id` or `document_id`.
pub const UNKNOWN_FIELD: &str = "unknown";

/// Unit of work taken off the ingestion queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Submitting user, or [`UNKNOWN_FIELD`].
    pub user_id: String,
    /// Document identifier, or [`UNKNOWN_FIELD`].
    pub document_id: String,
    /// Free text submitted with the task, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Deserialize)]
struct TaskMessage {
    #[serde(default)]
    user_id: Option<serde_json::Value>,
    #[serde(default)]
    document_id: Option<serde_json::Value>,
    #[serde(default)]
    content: Option<String>,
}

impl Task {
    /// Decode a queue message.
    ///
    /// String ids are kept and numeric ids use their JSON text. Missing, null, or any other
    /// id shape becomes [`UNKNOWN_FIELD`].
    pub fn from_slice(raw: &[u8]) -> Result<Self, TaskError> {
        let message: TaskMessage = serde_json::from_slice(raw).map_err(TaskError::Decode)?;
        Ok(Self {
            user_id: id_or_placeholder(message.user_id),
            document_id: id_or_placeholder(message.document_id),
            content: message.content,
        })
    }

    /// Submitted text when present and not blank.
    pub fn submitted_content(&self) -> Option<&str> {
        self.content
            .as_deref()
            .filter(|content| !content.trim().is_empty())
    }

    /// Point-id scope for submitted text.
    pub fn content_scope(&self) -> String {
        format!("{}/{}", self.user_id, self.document_id)
    }
}

fn id_or_placeholder(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(id)) => id,
        Some(serde_json::Value::Number(id)) => id.to_string(),
        _ => UNKNOWN_FIELD.to_string(),
    }
}

/// Errors produced while handling one task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The message was not a JSON object of the expected shape.
    #[error("Malformed task message: {0}")]
    Decode(#[source] serde_json::Error),
    /// No catalog entry matches the task's document id.
    #[error("Unknown document: {0}")]
    UnknownDocument(String),
    /// The catalog names the document but no library directory holds the file.
    #[error("Document {0} is missing from every library directory")]
    DocumentUnavailable(String),
    /// Indexing started but did not complete.
    #[error("Processing failed: {0}")]
    Processing(#[from] ProcessingError),
}

/// Performs the work described by one dequeued task.
#[async_trait]
pub trait TaskProcessor: Send + Sync {
    /// Process `task` to completion.
    async fn process(&self, task: Task) -> Result<(), TaskError>;
}

/// Routes tasks into the ingestion pipeline.
///
/// Submitted text goes to the wire collection; otherwise the document id is looked up in the
/// catalog and the document is indexed into the library collection. Each collection is
/// ensured once per processor.
pub struct IngestionTaskProcessor {
    pipeline: Arc<IngestionPipeline>,
    wire_collection: String,
    library_ready: OnceCell<bool>,
    wire_ready: OnceCell<bool>,
}

impl IngestionTaskProcessor {
    /// Create a processor writing submitted text into `wire_collection`.
    pub fn new(pipeline: Arc<IngestionPipeline>, wire_collection: impl Into<String>) -> Self {
        Self {
            pipeline,
            wire_collection: wire_collection.into(),
            library_ready: OnceCell::new(),
            wire_ready: OnceCell::new(),
        }
    }

    async fn index_content(&self, task: &Task, content: &str) -> Result<(), TaskError> {
        let collection = self.wire_collection.as_str();
        self.wire_ready
            .get_or_try_init(|| self.pipeline.ensure_collection(collection))
            .await?;

        let payload_base = wire_payload_base(&task.user_id, &task.document_id);
        let stats = self
            .pipeline
            .ingest_text(collection, content, &payload_base, &task.content_scope())
            .await?;
        tracing::info!(
            user_id = %task.user_id,
            document_id = %task.document_id,
            collection,
            chunks = stats.chunks,
            "Submitted content indexed"
        );
        Ok(())
    }

    async fn index_catalog_document(&self, task: &Task) -> Result<(), TaskError> {
        let entry = self
            .pipeline
            .catalog()
            .find_document(&task.document_id)
            .ok_or_else(|| TaskError::UnknownDocument(task.document_id.clone()))?;

        let collection = self.pipeline.settings().collection.as_str();
        self.library_ready
            .get_or_try_init(|| self.pipeline.ensure_collection(collection))
            .await?;

        match self.pipeline.ingest_document(entry).await {
            DocumentOutcome::Indexed(stats) => {
                tracing::info!(
                    user_id = %task.user_id,
                    file = %entry.filename,
                    chunks = stats.chunks,
                    "Catalog document indexed"
                );
                Ok(())
            }
            DocumentOutcome::Skipped { .. } => {
                Err(TaskError::DocumentUnavailable(entry.filename.clone()))
            }
            DocumentOutcome::Failed { error } => Err(TaskError::Processing(error)),
        }
    }
}

#[async_trait]
impl TaskProcessor for IngestionTaskProcessor {
    async fn process(&self, task: Task) -> Result<(), TaskError> {
        tracing::info!(
            user_id = %task.user_id,
            document_id = %task.document_id,
            has_content = task.submitted_content().is_some(),
            "Processing task"
        );
        match task.submitted_content() {
            Some(content) => self.index_content(&task, content).await,
            None => self.index_catalog_document(&task).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, DocumentMetadata, MetadataCatalog};
    use crate::processing::fakes::{FakeEmbedder, FakeIndex, FakeLoader};
    use crate::processing::pipeline::{DEFAULT_BATCH_SIZE, PipelineSettings};
    use crate::qdrant::derive_point_id;
    use tempfile::TempDir;

    const DIM: usize = 3;

    struct Harness {
        processor: IngestionTaskProcessor,
        index: FakeIndex,
        _library: TempDir,
    }

    fn harness() -> Harness {
        let library = tempfile::tempdir().expect("library");
        std::fs::write(library.path().join("psychology_of_money.pdf"), b"").expect("touch");
        let catalog = MetadataCatalog::new(vec![
            CatalogEntry {
                filename: "psychology_of_money.pdf".into(),
                metadata: DocumentMetadata {
                    title: "The Psychology of Money".into(),
                    author: "Morgan Housel".into(),
                    region: "global".into(),
                    topic: "psychology".into(),
                },
            },
            CatalogEntry {
                filename: "absent.pdf".into(),
                metadata: DocumentMetadata {
                    title: "Absent".into(),
                    author: "Nobody".into(),
                    region: "us".into(),
                    topic: "none".into(),
                },
            },
        ])
        .expect("catalog");
        let index = FakeIndex::default();
        let loader = FakeLoader::default()
            .with_document("psychology_of_money.pdf", vec!["Save more.".into()]);
        let pipeline = IngestionPipeline::new(
            Arc::new(FakeEmbedder::new(DIM)),
            Arc::new(index.clone()),
            Arc::new(loader),
            catalog,
            PipelineSettings {
                collection: "wisdom".into(),
                dimension: DIM,
                batch_size: DEFAULT_BATCH_SIZE,
                library_dirs: vec![library.path().to_path_buf()],
            },
        );
        Harness {
            processor: IngestionTaskProcessor::new(Arc::new(pipeline), "wire"),
            index,
            _library: library,
        }
    }

    fn task(document_id: &str, content: Option<&str>) -> Task {
        Task {
            user_id: "u-1".into(),
            document_id: document_id.into(),
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn decode_fills_placeholders() {
        let task = Task::from_slice(br#"{"document_id": null}"#).expect("task");
        assert_eq!(task.user_id, UNKNOWN_FIELD);
        assert_eq!(task.document_id, UNKNOWN_FIELD);
        assert_eq!(task.content, None);

        let task = Task::from_slice(br#"{"user_id":"u","document_id":"d","content":"hi"}"#)
            .expect("task");
        assert_eq!(task.content.as_deref(), Some("hi"));
        assert_eq!(task.content_scope(), "u/d");
    }

    #[test]
    fn decode_tolerates_non_string_ids() {
        let task = Task::from_slice(br#"{"user_id":7,"document_id":"a.pdf"}"#).expect("task");
        assert_eq!(task.user_id, "7");
        assert_eq!(task.document_id, "a.pdf");

        let task =
            Task::from_slice(br#"{"user_id":{"id":1},"document_id":["a.pdf"]}"#).expect("task");
        assert_eq!(task.user_id, UNKNOWN_FIELD);
        assert_eq!(task.document_id, UNKNOWN_FIELD);

        let task = Task::from_slice(br#"{"user_id":true,"document_id":42}"#).expect("task");
        assert_eq!(task.user_id, UNKNOWN_FIELD);
        assert_eq!(task.document_id, "42");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            Task::from_slice(b"not json"),
            Err(TaskError::Decode(_))
        ));
        assert!(matches!(
            Task::from_slice(br#"["a", "b"]"#),
            Err(TaskError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn content_is_indexed_into_wire_collection() {
        let harness = harness();

        harness
            .processor
            .process(task("note-1", Some("Index funds beat most managers.")))
            .await
            .expect("processed");

        let points = harness.index.points("wire");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, derive_point_id("u-1/note-1", 0));
        assert_eq!(points[0].payload["source_type"], "wire");
        assert_eq!(points[0].payload["user_id"], "u-1");
        assert!(harness.index.points("wisdom").is_empty());
    }

    #[tokio::test]
    async fn document_id_resolves_with_pdf_suffix() {
        let harness = harness();

        harness
            .processor
            .process(task("psychology_of_money", None))
            .await
            .expect("processed");

        let points = harness.index.points("wisdom");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, derive_point_id("psychology_of_money.pdf", 0));
        assert_eq!(points[0].payload["author"], "Morgan Housel");
    }

    #[tokio::test]
    async fn blank_content_falls_back_to_catalog() {
        let harness = harness();

        harness
            .processor
            .process(task("psychology_of_money.pdf", Some("  \n")))
            .await
            .expect("processed");

        assert_eq!(harness.index.points("wisdom").len(), 1);
        assert!(harness.index.points("wire").is_empty());
    }

    #[tokio::test]
    async fn unknown_and_unavailable_documents_fail() {
        let harness = harness();

        let error = harness
            .processor
            .process(task("unknown", None))
            .await
            .unwrap_err();
        assert!(matches!(error, TaskError::UnknownDocument(ref id) if id == "unknown"));

        let error = harness
            .processor
            .process(task("absent", None))
            .await
            .unwrap_err();
        assert!(matches!(error, TaskError::DocumentUnavailable(ref file) if file == "absent.pdf"));
        assert!(harness.index.upserts().is_empty());
    }

    #[tokio::test]
    async fn collections_are_created_once() {
        let harness = harness();

        for _ in 0..2 {
            harness
                .processor
                .process(task("psychology_of_money", None))
                .await
                .expect("document");
            harness
                .processor
                .process(task("note", Some("text")))
                .await
                .expect("content");
        }

        let created: Vec<_> = harness
            .index
            .created()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(created, vec!["wisdom", "wire"]);
    }
}
