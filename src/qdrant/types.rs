//! Shared types used by the Qdrant client and helpers.

use reqwest::StatusCode;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Errors returned while interacting with Qdrant.
#[derive(Debug, Error)]
pub enum QdrantError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Qdrant URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Qdrant responded with an unexpected status code.
    #[error("Unexpected Qdrant response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Qdrant.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Similarity metric configured on a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    /// Cosine similarity.
    Cosine,
}

impl Distance {
    /// Name used by the Qdrant REST API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cosine => "Cosine",
        }
    }
}

impl Serialize for Distance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Vector configuration used when creating a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VectorParams {
    /// Dimensionality of every vector stored in the collection.
    pub size: u64,
    /// Similarity metric.
    pub distance: Distance,
}

impl VectorParams {
    /// Cosine-metric parameters for the given dimensionality.
    pub fn cosine(size: u64) -> Self {
        Self {
            size,
            distance: Distance::Cosine,
        }
    }
}

/// Unit written to the vector index: identifier, embedding, and payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexPoint {
    /// Stable identifier; writing the same id again overwrites the point.
    pub id: Uuid,
    /// Embedding vector produced for the chunk.
    pub vector: Vec<f32>,
    /// Metadata stored next to the vector.
    pub payload: Map<String, Value>,
}
