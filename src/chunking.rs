//! Deterministic transcript chunking.
//!
//! Splits a flattened transcript into fixed-size character windows,
//! preferring to cut on whitespace so words stay whole. With the default
//! overlap of 0 the chunks concatenate back to the exact input text.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A piece of transcript text with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub source: String,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }
}

/// Fixed-size character-window splitter.
#[derive(Debug, Clone)]
pub struct TranscriptChunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for TranscriptChunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 0,
        }
    }
}

impl TranscriptChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split `text` into ordered chunks, each carrying `source`.
    ///
    /// Windows are measured in characters, not bytes. A window ending in
    /// the middle of a word backs up to the last whitespace inside it;
    /// a window with no whitespace at all is cut hard at `chunk_size`.
    /// Content is never trimmed, so with overlap 0 concatenating the
    /// chunks reproduces the input exactly.
    pub fn split(&self, text: &str, source: &str) -> Vec<Document> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let window_end = (start + self.chunk_size).min(chars.len());
            let cut = if window_end == chars.len() {
                window_end
            } else {
                self.cut_point(&chars, start, window_end)
            };

            chunks.push(Document::new(
                chars[start..cut].iter().collect::<String>(),
                source,
            ));

            if cut >= chars.len() {
                break;
            }
            // Resume `overlap` characters back, but always move forward.
            start = cut.saturating_sub(self.overlap).max(start + 1);
        }

        debug!(
            "✂️ Split {} characters into {} chunks (size {}, overlap {})",
            chars.len(),
            chunks.len(),
            self.chunk_size,
            self.overlap
        );

        chunks
    }

    /// Where to cut a full window. `window_end < chars.len()` holds here.
    fn cut_point(&self, chars: &[char], start: usize, window_end: usize) -> usize {
        // The boundary already falls on whitespace on either side, so the
        // cut does not break a word.
        if chars[window_end - 1].is_whitespace() || chars[window_end].is_whitespace() {
            return window_end;
        }
        match chars[start..window_end]
            .iter()
            .rposition(|c| c.is_whitespace())
        {
            Some(pos) => start + pos + 1,
            None => window_end,
        }
    }
}
