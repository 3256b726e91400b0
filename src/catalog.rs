//! Static library catalog mapping source files to descriptive metadata.
//!
//! The catalog is immutable once loaded. Entry order is preserved so library ingestion walks
//! documents in the order they were declared.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a catalog from disk.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read.
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        /// Path of the catalog file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Catalog file was not valid JSON for the expected shape.
    #[error("Invalid catalog {path}: {source}")]
    Parse {
        /// Path of the catalog file.
        path: PathBuf,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
    /// The same filename appeared more than once.
    #[error("Duplicate catalog entry: {0}")]
    DuplicateEntry(String),
}

/// Descriptive metadata attached to every chunk of a library document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Human readable title.
    pub title: String,
    /// Author credited for the document.
    pub author: String,
    /// Market or region the document focuses on.
    pub region: String,
    /// Topic used for filtering at retrieval time.
    pub topic: String,
}

/// One source document and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// File name of the document inside the library directory.
    pub filename: String,
    /// Metadata copied into each indexed chunk.
    #[serde(flatten)]
    pub metadata: DocumentMetadata,
}

/// Immutable, ordered lookup table of library documents.
#[derive(Debug, Clone, Default)]
pub struct MetadataCatalog {
    entries: Vec<CatalogEntry>,
}

const BUILTIN_ENTRIES: [(&str, &str, &str, &str, &str); 4] = [
    (
        "intelligent_investor.pdf",
        "The Intelligent Investor",
        "Benjamin Graham",
        "global",
        "value_investing",
    ),
    (
        "psychology_of_money.pdf",
        "The Psychology of Money",
        "Morgan Housel",
        "global",
        "psychology",
    ),
    (
        "stocks_to_riches.pdf",
        "Stocks to Riches",
        "Parag Parikh",
        "india",
        "growth_investing",
    ),
    (
        "one_up_on_wall_street.pdf",
        "One Up On Wall Street",
        "Peter Lynch",
        "us",
        "retail_strategy",
    ),
];

impl MetadataCatalog {
    /// Build a catalog from explicit entries, rejecting duplicate filenames.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        for (idx, entry) in entries.iter().enumerate() {
            if entries[..idx].iter().any(|prior| prior.filename == entry.filename) {
                return Err(CatalogError::DuplicateEntry(entry.filename.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        let entries = BUILTIN_ENTRIES
            .iter()
            .map(|(filename, title, author, region, topic)| CatalogEntry {
                filename: (*filename).to_string(),
                metadata: DocumentMetadata {
                    title: (*title).to_string(),
                    author: (*author).to_string(),
                    region: (*region).to_string(),
                    topic: (*topic).to_string(),
                },
            })
            .collect();
        Self { entries }
    }

    /// Load a catalog from a JSON array of `{filename, title, author, region, topic}` objects.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), entries = entries.len(), "Loaded catalog file");
        Self::new(entries)
    }

    /// Use the catalog file when one is configured, otherwise the built-in table.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::builtin()),
        }
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of catalog entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact filename lookup.
    pub fn get(&self, filename: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.filename == filename)
    }

    /// Resolve a task's document identifier: the exact filename, or the filename without `.pdf`.
    pub fn find_document(&self, document_id: &str) -> Option<&CatalogEntry> {
        let trimmed = document_id.trim();
        self.get(trimmed)
            .or_else(|| self.get(&format!("{trimmed}.pdf")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_keeps_declaration_order() {
        let catalog = MetadataCatalog::builtin();
        let names: Vec<_> = catalog.entries().iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "intelligent_investor.pdf",
                "psychology_of_money.pdf",
                "stocks_to_riches.pdf",
                "one_up_on_wall_street.pdf",
            ]
        );
        let entry = catalog.get("stocks_to_riches.pdf").expect("entry");
        assert_eq!(entry.metadata.author, "Parag Parikh");
        assert_eq!(entry.metadata.region, "india");
    }

    #[test]
    fn find_document_accepts_stem() {
        let catalog = MetadataCatalog::builtin();
        let entry = catalog.find_document("psychology_of_money").expect("stem match");
        assert_eq!(entry.filename, "psychology_of_money.pdf");
        assert!(catalog.find_document("missing").is_none());
    }

    #[test]
    fn json_catalog_round_trips_flattened_metadata() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"filename":"a.pdf","title":"A","author":"Ann","region":"us","topic":"t"}}]"#
        )
        .expect("write");

        let catalog = MetadataCatalog::from_json_file(file.path()).expect("catalog");
        assert_eq!(catalog.len(), 1);
        let entry = catalog.get("a.pdf").expect("entry");
        assert_eq!(entry.metadata.title, "A");
        assert_eq!(entry.metadata.topic, "t");
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        let entry = MetadataCatalog::builtin().entries()[0].clone();
        let error = MetadataCatalog::new(vec![entry.clone(), entry]).unwrap_err();
        assert!(matches!(error, CatalogError::DuplicateEntry(name) if name == "intelligent_investor.pdf"));
    }
}
