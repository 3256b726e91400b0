//! Qdrant vector store integration.

pub mod client;
pub mod payload;
pub mod types;

pub use client::{QdrantService, VectorIndex, ensure_collection};
pub use payload::{
    SOURCE_TYPE_BOOK, SOURCE_TYPE_WIRE, book_payload_base, clean_chunk_text, derive_point_id,
    wire_payload_base, with_page_content,
};
pub use types::{Distance, IndexPoint, QdrantError, VectorParams};
