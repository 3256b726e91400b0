//! In-memory stand-ins for the pipeline's collaborators.

use crate::embedding::{EmbeddingClient, EmbeddingClientError};
use crate::processing::loader::{DocumentLoader, LoadError};
use crate::qdrant::{IndexPoint, QdrantError, VectorIndex, VectorParams};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum EmbedMode {
    Exact,
    DropOne,
    WrongDimension,
    Fail,
}

#[derive(Clone)]
pub(crate) struct FakeEmbedder {
    dimension: usize,
    mode: EmbedMode,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeEmbedder {
    pub(crate) fn new(dimension: usize) -> Self {
        Self::with_mode(dimension, EmbedMode::Exact)
    }

    pub(crate) fn with_mode(dimension: usize, mode: EmbedMode) -> Self {
        Self {
            dimension,
            mode,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn batch_sizes(&self) -> Vec<usize> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .map(Vec::len)
            .collect()
    }

    pub(crate) fn inputs(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .flatten()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EmbeddingClient for FakeEmbedder {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        let count = texts.len();
        self.calls.lock().expect("calls lock").push(texts);
        let (count, dimension) = match self.mode {
            EmbedMode::Exact => (count, self.dimension),
            EmbedMode::DropOne => (count.saturating_sub(1), self.dimension),
            EmbedMode::WrongDimension => (count, self.dimension + 1),
            EmbedMode::Fail => {
                return Err(EmbeddingClientError::GenerationFailed(
                    "provider unavailable".into(),
                ));
            }
        };
        Ok((0..count).map(|idx| vec![idx as f32; dimension]).collect())
    }
}

#[derive(Default)]
struct IndexState {
    collections: HashSet<String>,
    created: Vec<(String, VectorParams)>,
    upserts: Vec<(String, Vec<IndexPoint>)>,
    unreachable: bool,
}

#[derive(Clone, Default)]
pub(crate) struct FakeIndex {
    state: Arc<Mutex<IndexState>>,
}

impl FakeIndex {
    pub(crate) fn unreachable() -> Self {
        let index = Self::default();
        index.state.lock().expect("index lock").unreachable = true;
        index
    }

    pub(crate) fn created(&self) -> Vec<(String, VectorParams)> {
        self.state.lock().expect("index lock").created.clone()
    }

    pub(crate) fn upserts(&self) -> Vec<(String, Vec<IndexPoint>)> {
        self.state.lock().expect("index lock").upserts.clone()
    }

    pub(crate) fn points(&self, collection: &str) -> Vec<IndexPoint> {
        self.upserts()
            .into_iter()
            .filter(|(name, _)| name == collection)
            .flat_map(|(_, points)| points)
            .collect()
    }

    fn check_reachable(&self) -> Result<(), QdrantError> {
        if self.state.lock().expect("index lock").unreachable {
            return Err(QdrantError::UnexpectedStatus {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "down".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn collection_exists(&self, collection_name: &str) -> Result<bool, QdrantError> {
        self.check_reachable()?;
        Ok(self
            .state
            .lock()
            .expect("index lock")
            .collections
            .contains(collection_name))
    }

    async fn create_collection(
        &self,
        collection_name: &str,
        params: VectorParams,
    ) -> Result<(), QdrantError> {
        self.check_reachable()?;
        let mut state = self.state.lock().expect("index lock");
        state.collections.insert(collection_name.to_string());
        state.created.push((collection_name.to_string(), params));
        Ok(())
    }

    async fn upsert_points(
        &self,
        collection_name: &str,
        points: Vec<IndexPoint>,
    ) -> Result<(), QdrantError> {
        self.check_reachable()?;
        self.state
            .lock()
            .expect("index lock")
            .upserts
            .push((collection_name.to_string(), points));
        Ok(())
    }
}

/// Serves canned pages keyed by file name; unknown files fail to load.
#[derive(Clone, Default)]
pub(crate) struct FakeLoader {
    pages: HashMap<String, Vec<String>>,
}

impl FakeLoader {
    pub(crate) fn with_document(mut self, file_name: &str, pages: Vec<String>) -> Self {
        self.pages.insert(file_name.to_string(), pages);
        self
    }
}

#[async_trait]
impl DocumentLoader for FakeLoader {
    async fn load_pages(&self, path: &Path) -> Result<Vec<String>, LoadError> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        self.pages.get(name).cloned().ok_or_else(|| LoadError::Pdf {
            path: path.to_path_buf(),
            message: "no text layer".into(),
        })
    }
}
