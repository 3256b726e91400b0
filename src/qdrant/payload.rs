//! Helpers for constructing point payloads and identifiers.

use crate::catalog::DocumentMetadata;
use serde_json::{Map, Value};
use uuid::Uuid;

/// `source_type` recorded for library documents.
pub const SOURCE_TYPE_BOOK: &str = "book";
/// `source_type` recorded for content submitted through the gateway.
pub const SOURCE_TYPE_WIRE: &str = "wire";

/// Remove NUL characters and surrounding whitespace from chunk text.
pub fn clean_chunk_text(text: &str) -> String {
    text.replace('\0', "").trim().to_string()
}

/// Derive the point identifier for the chunk at `sequence_index` within `scope`.
///
/// The id depends only on the scope (a filename, or `user/document` for gateway content) and
/// the chunk position, never on the chunk text, so re-ingesting overwrites earlier points.
pub fn derive_point_id(scope: &str, sequence_index: usize) -> Uuid {
    let name = format!("{scope}:{sequence_index}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

/// Payload fields shared by every chunk of a library document.
pub fn book_payload_base(metadata: &DocumentMetadata) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("title".into(), Value::String(metadata.title.clone()));
    payload.insert("author".into(), Value::String(metadata.author.clone()));
    payload.insert("region".into(), Value::String(metadata.region.clone()));
    payload.insert("topic".into(), Value::String(metadata.topic.clone()));
    payload.insert(
        "source_type".into(),
        Value::String(SOURCE_TYPE_BOOK.to_string()),
    );
    payload
}

/// Payload fields shared by every chunk of gateway-submitted content.
pub fn wire_payload_base(user_id: &str, document_id: &str) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("user_id".into(), Value::String(user_id.to_string()));
    payload.insert("document_id".into(), Value::String(document_id.to_string()));
    payload.insert(
        "source_type".into(),
        Value::String(SOURCE_TYPE_WIRE.to_string()),
    );
    payload
}

/// Copy `base` and add the chunk text under `page_content`.
pub fn with_page_content(base: &Map<String, Value>, page_content: &str) -> Map<String, Value> {
    let mut payload = base.clone();
    payload.insert(
        "page_content".into(),
        Value::String(page_content.to_string()),
    );
    payload
}
