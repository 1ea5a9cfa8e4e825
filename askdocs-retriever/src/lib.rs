//! askdocs-retriever: document-to-vector synchronization and retrieval
//!
//! This crate keeps an external vector store consistent with the live state
//! of a watched documents directory, and answers questions against that store
//! through a locally hosted language model.
//!
//! ## Key Modules
//!
//! - **[`retrieval`]**: text extraction, the index writer, the debounced
//!   directory synchronizer, suggested-question regeneration, and the
//!   question-answering pipeline
//! - **[`storage`]**: the [`storage::VectorStore`] seam with Pinecone-style
//!   HTTP and in-memory implementations
//! - **[`llm`]**: the [`llm::LanguageModel`] seam with an Ollama HTTP client
//!
//! ## Architecture
//!
//! ```text
//! docs/ → notify watcher → per-file debounce → IndexWriter → VectorStore
//!                                                               ↓
//!                         question → RetrievalPipeline ← nearest chunks
//!                                          ↓
//!                                   LanguageModel (Ollama)
//! ```
//!
//! The write path (synchronizer) and the read path (pipeline) share only the
//! vector store; a question answered mid-reindex may transiently see stale or
//! missing chunks.

pub mod llm;
pub mod retrieval;
pub mod storage;
