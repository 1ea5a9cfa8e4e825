//! Vector storage abstraction for askdocs
//!
//! The synchronizer writes [`ChunkRecord`]s keyed by the stable
//! `"<file>-<ordinal>"` chunk id, and the retrieval pipeline reads back
//! nearest neighbors as [`ScoredChunk`]s. Implementations:
//!
//! - [`pinecone::PineconeStore`]: serverless Pinecone-style HTTP API,
//!   including one-time index provisioning at startup
//! - [`memory::MemoryStore`]: brute-force cosine store for tests and
//!   development
//!
//! The store provides per-record consistency only. Nothing here guards a
//! write racing a concurrent read; the directory remains the source of truth
//! and the index converges after each settled change.

use async_trait::async_trait;

pub mod memory;
pub mod pinecone;

pub use memory::MemoryStore;
pub use pinecone::{PineconeConfig, PineconeStore};

/// A stored chunk: id, embedding vector, and the original text as metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkRecord {
    /// Stable id, `"<file name>-<ordinal>"`.
    pub id: String,
    /// Embedding of `text`, fixed dimension per deployment.
    pub embedding: Vec<f32>,
    /// The chunk text, stored so retrieval needs no second lookup.
    pub text: String,
}

/// A query match in the store's rank order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub id: String,
    pub text: String,
    pub score: f32,
}

/// Errors from vector-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transport-level failure talking to the store.
    #[error("vector store transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("vector store returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// A data-plane call was made before `init` provisioned the index.
    #[error("vector index is not provisioned yet")]
    NotReady,
}

/// Narrow seam over the external vector database.
///
/// `delete_one` on an id that does not exist is a successful no-op; the index
/// writer's range deletes rely on that.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Provision the backing index if needed and wait until it is ready.
    /// Called once at startup.
    async fn init(&self) -> Result<(), StoreError>;

    /// Insert or overwrite one record.
    async fn upsert(&self, record: ChunkRecord) -> Result<(), StoreError>;

    /// Return up to `top_k` nearest records by similarity, best first.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, StoreError>;

    /// Delete one record by id. Missing ids are not an error.
    async fn delete_one(&self, id: &str) -> Result<(), StoreError>;
}
