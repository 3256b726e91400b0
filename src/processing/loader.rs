//! Document loading: turn a library file into ordered page texts.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading a library document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// PDF text extraction failed.
    #[error("Failed to extract text from {path}: {message}")]
    Pdf {
        /// Path of the PDF.
        path: PathBuf,
        /// Extractor error message.
        message: String,
    },
    /// File extension is not handled by this loader.
    #[error("Unsupported document type: {0}")]
    Unsupported(PathBuf),
}

/// Reads a document into page texts, in page order.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load the pages of the document at `path`.
    async fn load_pages(&self, path: &Path) -> Result<Vec<String>, LoadError>;
}

/// Loader for the library directory: PDFs through `pdf-extract`, `.txt`/`.md` as plain text.
///
/// PDFs yield one entry per PDF page. Text files are split on form feeds. Blank pages are
/// dropped in both cases.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryLoader;

#[async_trait]
impl DocumentLoader for LibraryLoader {
    async fn load_pages(&self, path: &Path) -> Result<Vec<String>, LoadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let pages = match extension.as_deref() {
            Some("pdf") => {
                let owned = path.to_path_buf();
                let pages = tokio::task::spawn_blocking(move || {
                    pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|err| {
                        LoadError::Pdf {
                            path: owned,
                            message: err.to_string(),
                        }
                    })
                })
                .await
                .map_err(|err| LoadError::Pdf {
                    path: path.to_path_buf(),
                    message: format!("extraction task failed: {err}"),
                })??;
                drop_blank_pages(pages)
            }
            Some("txt") | Some("md") => split_pages(&String::from_utf8_lossy(&bytes)),
            _ => return Err(LoadError::Unsupported(path.to_path_buf())),
        };

        tracing::debug!(path = %path.display(), pages = pages.len(), "Loaded document");
        Ok(pages)
    }
}

/// Split plain text on form feeds, dropping blank pages.
pub(crate) fn split_pages(text: &str) -> Vec<String> {
    drop_blank_pages(text.split('\x0C').map(str::to_string))
}

fn drop_blank_pages(pages: impl IntoIterator<Item = String>) -> Vec<String> {
    pages
        .into_iter()
        .filter(|page| !page.trim().is_empty())
        .collect()
}

/// Return the first existing `dir/filename` among `dirs`, in order.
pub fn resolve_document_path(dirs: &[PathBuf], filename: &str) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(filename))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_pages_uses_form_feeds() {
        let pages = split_pages("first page\x0C \n \x0Csecond page");
        assert_eq!(pages, vec!["first page", "second page"]);
    }

    #[test]
    fn resolve_prefers_primary_then_fallback() {
        let primary = tempfile::tempdir().expect("primary");
        let fallback = tempfile::tempdir().expect("fallback");
        std::fs::write(fallback.path().join("a.txt"), "fallback").expect("write");
        let dirs = vec![primary.path().to_path_buf(), fallback.path().to_path_buf()];

        assert_eq!(
            resolve_document_path(&dirs, "a.txt"),
            Some(fallback.path().join("a.txt"))
        );

        std::fs::write(primary.path().join("a.txt"), "primary").expect("write");
        assert_eq!(
            resolve_document_path(&dirs, "a.txt"),
            Some(primary.path().join("a.txt"))
        );
        assert_eq!(resolve_document_path(&dirs, "missing.pdf"), None);
    }

    #[tokio::test]
    async fn text_documents_load_as_pages() {
        let dir = tempfile::tempdir().expect("dir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "page one\x0Cpage two").expect("write");

        let pages = LibraryLoader.load_pages(&path).await.expect("pages");
        assert_eq!(pages, vec!["page one", "page two"]);
    }

    #[tokio::test]
    async fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().expect("dir");
        let path = dir.path().join("image.png");
        std::fs::write(&path, [0u8, 1, 2]).expect("write");

        let error = LibraryLoader.load_pages(&path).await.unwrap_err();
        assert!(matches!(error, LoadError::Unsupported(_)));
    }

    /// Build a PDF with one Courier text line per page.
    fn write_pdf(path: &Path, page_texts: &[&str]) {
        use lopdf::content::{Content, Operation};
        use lopdf::{Document, Object, Stream, dictionary};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).expect("save pdf");
    }

    #[tokio::test]
    async fn pdf_pages_load_separately() {
        let dir = tempfile::tempdir().expect("dir");
        let path = dir.path().join("two-pages.pdf");
        write_pdf(&path, &["Alpha page one text", "Bravo page two text"]);

        let pages = LibraryLoader.load_pages(&path).await.expect("pages");
        assert_eq!(pages.len(), 2, "pages: {pages:?}");
        assert!(pages[0].contains("Alpha page one text"));
        assert!(!pages[0].contains("Bravo"));
        assert!(pages[1].contains("Bravo page two text"));
    }

    #[tokio::test]
    async fn blank_pdf_pages_are_dropped() {
        let dir = tempfile::tempdir().expect("dir");
        let path = dir.path().join("gap.pdf");
        write_pdf(&path, &["First", " ", "Third"]);

        let pages = LibraryLoader.load_pages(&path).await.expect("pages");
        assert_eq!(pages.len(), 2, "pages: {pages:?}");
        assert!(pages[0].contains("First"));
        assert!(pages[1].contains("Third"));
    }

    #[tokio::test]
    async fn corrupt_pdf_reports_extraction_error() {
        let dir = tempfile::tempdir().expect("dir");
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").expect("write");

        let error = LibraryLoader.load_pages(&path).await.unwrap_err();
        assert!(matches!(error, LoadError::Pdf { .. }));
    }
}
