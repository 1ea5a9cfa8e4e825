//! Word-bounded chunking and stable chunk identifiers.
//!
//! Documents are split on whitespace into tokens, and tokens are grouped into
//! chunks of at most `max_words` each. Joining the chunks of a document with
//! single spaces reproduces the whitespace-normalized word sequence of the
//! original text, so no token is ever split or reordered.
//!
//! Each chunk is addressed as `"<file name>-<ordinal>"`. The id carries its
//! own provenance: given a file name, every id that could belong to it can be
//! re-derived from the name plus an ordinal range, without a lookup table.

use serde::Serialize;

/// Default upper bound on words per chunk.
pub const DEFAULT_MAX_CHUNK_WORDS: usize = 500;

/// Build the vector-store id for a chunk of `file_name` at `ordinal`.
///
/// Deterministic and injective over distinct `(file_name, ordinal)` pairs,
/// with one documented exception: a file literally named like another file
/// plus a `-<number>` suffix (`"a-0"` vs chunk 0 of `"a"`) collides. That
/// ambiguity is accepted rather than special-cased.
///
/// ```
/// use askdocs_context::chunk_id;
/// assert_eq!(chunk_id("report.pdf", 2), "report.pdf-2");
/// ```
pub fn chunk_id(file_name: &str, ordinal: usize) -> String {
    format!("{file_name}-{ordinal}")
}

/// A contiguous slice of a document's extracted text, with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentChunk {
    /// Name of the source file within the watched directory.
    pub file_name: String,
    /// 0-based position of this chunk within the file, contiguous, no gaps.
    pub ordinal: usize,
    /// Space-joined words of this chunk.
    pub text: String,
}

impl DocumentChunk {
    /// The vector-store id of this chunk.
    pub fn id(&self) -> String {
        chunk_id(&self.file_name, self.ordinal)
    }
}

/// Splits text into chunks of at most `max_words` whitespace-delimited words.
#[derive(Debug, Clone)]
pub struct WordChunker {
    max_words: usize,
}

impl Default for WordChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHUNK_WORDS)
    }
}

impl WordChunker {
    /// Create a chunker with the given word bound. A bound of 0 is clamped
    /// to 1 so the chunker stays total.
    pub fn new(max_words: usize) -> Self {
        Self {
            max_words: max_words.max(1),
        }
    }

    /// The configured per-chunk word bound.
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Split `text` into space-joined word runs of at most `max_words` each.
    ///
    /// Empty or whitespace-only input yields no chunks. Chunks are never
    /// empty, tokens are never split, and order is preserved: joining the
    /// result with single spaces equals the whitespace-normalized input.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        words
            .chunks(self.max_words)
            .map(|run| run.join(" "))
            .collect()
    }

    /// Chunk `text` and attach provenance for `file_name`.
    pub fn chunk_document(&self, file_name: &str, text: &str) -> Vec<DocumentChunk> {
        self.chunk(text)
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| DocumentChunk {
                file_name: file_name.to_string(),
                ordinal,
                text,
            })
            .collect()
    }
}
