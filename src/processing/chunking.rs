//! Character-budget recursive chunking.
//!
//! Text is split on the coarsest separator that occurs in it (paragraph break, line break,
//! sentence end, space, then single characters). Pieces that still exceed the budget are split
//! again with the next separator. Small pieces are merged back into windows of at most
//! `chunk_size` characters, and each new window starts with up to `chunk_overlap` characters
//! carried over from the end of the previous one.
//!
//! Lengths are counted in `char`s, never bytes, so multi-byte text is budgeted the same way as
//! ASCII.

use std::collections::VecDeque;

use super::types::{Chunk, ChunkingError};

/// Default chunk budget in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
/// Separators from coarsest to finest; the empty separator cuts between characters.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Recursive character splitter with overlap.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Chunker {
    /// Build a chunker with explicit budgets and the default separators.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkingError> {
        if chunk_size == 0 {
            return Err(ChunkingError::InvalidChunkSize);
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkingError::OverlapTooLarge {
                chunk_size,
                chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        })
    }

    /// Split every page of one document, numbering chunks across the whole document.
    ///
    /// Chunks never span a page boundary.
    pub fn split_pages<S: AsRef<str>>(&self, source: &str, pages: &[S]) -> Vec<Chunk> {
        pages
            .iter()
            .flat_map(|page| self.split_text(page.as_ref()))
            .enumerate()
            .map(|(sequence_index, text)| Chunk {
                text,
                source: source.to_string(),
                sequence_index,
            })
            .collect()
    }

    /// Split a single text into trimmed, non-empty chunks in document order.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = select_separator(text, separators);
        let splits = split_keeping_separator(text, separator);

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in splits {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge_splits(&pending));
                pending.clear();
            }
            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge_splits(&pending));
        }
        chunks
    }

    /// Merge small pieces into windows, carrying at most `chunk_overlap` characters forward.
    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in splits {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                push_joined(&mut docs, &window);
                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }
            window.push_back((piece, len));
            total += len;
        }
        push_joined(&mut docs, &window);
        docs
    }
}

fn select_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (idx, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[idx + 1..]);
        }
    }
    ("", &[])
}

/// Split on `separator`, attaching each separator to the start of the piece that follows it.
fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(idx, ch)| &text[idx..idx + ch.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn push_joined(docs: &mut Vec<String>, window: &VecDeque<(&str, usize)>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
