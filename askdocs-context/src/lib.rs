//! askdocs-context: document chunking and chunk addressing
//!
//! This crate turns extracted document text into bounded, addressable chunks
//! for the askdocs indexing pipeline. It is deliberately free of I/O and async
//! code so the chunking laws can be tested in isolation.
//!
//! ## Key items
//!
//! - [`WordChunker`]: splits text into runs of at most N whitespace-delimited
//!   words
//! - [`DocumentChunk`]: one chunk plus its provenance (file name + ordinal)
//! - [`chunk_id`]: the stable `"<file>-<ordinal>"` identifier used as the
//!   vector-store key

pub mod text;

pub use text::{DEFAULT_MAX_CHUNK_WORDS, DocumentChunk, WordChunker, chunk_id};
