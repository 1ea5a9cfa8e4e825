//! askdocs-embed: text embedding for the askdocs pipeline
//!
//! Wraps local ONNX embedding models (via fastembed) behind the
//! [`EmbeddingProvider`] trait so the indexing and retrieval pipelines never
//! depend on a concrete model runtime. The reference deployment uses
//! all-MiniLM-L12-v2 (384 dimensions).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use askdocs_embed::{EmbedConfig, EmbeddingProvider, FastEmbedProvider};
//!
//! # async fn example() -> askdocs_embed::Result<()> {
//! let provider = FastEmbedProvider::create(EmbedConfig::default()).await?;
//! let vector = provider.embed_text("what is in these documents?").await?;
//! assert_eq!(vector.len(), provider.dimension());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod provider;

pub use config::EmbedConfig;
pub use error::{EmbedError, Result};
pub use provider::{EmbeddingProvider, FastEmbedProvider};
