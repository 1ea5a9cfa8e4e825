//! Writes documents into the vector store and removes them again.
//!
//! `index_file` is the single write path: extract, chunk, embed, upsert.
//! `delete_all_for_file` is its inverse and deliberately does not consult any
//! secondary index: it re-derives every id the file could own from the file
//! name plus a bounded ordinal range and deletes them all, counting on
//! missing-id deletes being no-ops. A document with more chunks than the
//! ceiling leaves orphaned records behind; that is the configured scale
//! limit, not something this module works around.

use askdocs_context::{WordChunker, chunk_id};
use askdocs_embed::EmbeddingProvider;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::extract::{self, ExtractError};
use crate::storage::{ChunkRecord, VectorStore};

/// Tuning knobs for the write path.
#[derive(Debug, Clone)]
pub struct IndexWriterConfig {
    /// Word bound per chunk.
    pub max_chunk_words: usize,
    /// Highest ordinal (exclusive) probed by `delete_all_for_file`.
    pub delete_ceiling: usize,
    /// Deletes issued concurrently per batch window.
    pub delete_batch: usize,
}

impl Default for IndexWriterConfig {
    fn default() -> Self {
        Self {
            max_chunk_words: askdocs_context::DEFAULT_MAX_CHUNK_WORDS,
            delete_ceiling: 10_000,
            delete_batch: 200,
        }
    }
}

impl IndexWriterConfig {
    pub fn with_max_chunk_words(mut self, words: usize) -> Self {
        self.max_chunk_words = words;
        self
    }

    pub fn with_delete_range(mut self, ceiling: usize, batch: usize) -> Self {
        self.delete_ceiling = ceiling;
        self.delete_batch = batch.max(1);
        self
    }
}

/// The write half of the pipeline: documents in, chunk records out.
pub struct IndexWriter {
    config: IndexWriterConfig,
    chunker: WordChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl IndexWriter {
    pub fn new(
        config: IndexWriterConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            chunker: WordChunker::new(config.max_chunk_words),
            config,
            embedder,
            store,
        }
    }

    /// Extract, chunk, embed, and upsert one file. Returns the number of
    /// chunks written.
    ///
    /// Failures never propagate: unsupported or unreadable files are logged
    /// and skipped, and a chunk whose embed or upsert fails is dropped while
    /// the remaining chunks still go in. A partially indexed file is an
    /// accepted degraded state; the next settled change re-indexes it.
    pub async fn index_file(&self, path: &Path) -> usize {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            warn!("skipping path without a usable file name: {}", path.display());
            return 0;
        };

        let content = match extract::extract_text(path).await {
            Ok(content) => content,
            Err(ExtractError::UnsupportedFormat { extension }) => {
                warn!("skipping {file_name}: unsupported format .{extension}");
                return 0;
            }
            Err(err) => {
                warn!("failed to extract {file_name}: {err}");
                return 0;
            }
        };

        let content = content.trim();
        if content.is_empty() {
            info!("skipping {file_name}: no text content");
            return 0;
        }

        let chunks = self.chunker.chunk_document(file_name, content);
        let total = chunks.len();
        let mut written = 0;

        for chunk in chunks {
            let id = chunk.id();
            let embedding = match self.embedder.embed_text(&chunk.text).await {
                Ok(vector) => vector,
                Err(err) => {
                    warn!("failed to embed {id}: {err}");
                    continue;
                }
            };

            let record = ChunkRecord {
                id: id.clone(),
                embedding,
                text: chunk.text,
            };
            match self.store.upsert(record).await {
                Ok(()) => written += 1,
                Err(err) => warn!("failed to upsert {id}: {err}"),
            }
        }

        info!("indexed {file_name}: {written}/{total} chunks");
        written
    }

    /// Delete every chunk id the file could own, ordinals `0..ceiling`.
    ///
    /// Each batch window's deletes are issued concurrently and awaited
    /// together; windows run sequentially to bound outstanding calls. Most
    /// deletes are no-ops by design. Failures are logged and skipped so a
    /// flaky store call cannot leave the rest of the range untried.
    pub async fn delete_all_for_file(&self, file_name: &str) {
        let ceiling = self.config.delete_ceiling;
        let batch = self.config.delete_batch.max(1);

        let mut start = 0;
        while start < ceiling {
            let end = (start + batch).min(ceiling);
            let deletes = (start..end).map(|ordinal| async move {
                let id = chunk_id(file_name, ordinal);
                if let Err(err) = self.store.delete_one(&id).await {
                    debug!("delete of {id} failed: {err}");
                }
            });
            futures::future::join_all(deletes).await;
            start = end;
        }

        info!("removed all chunks for {file_name}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, ScoredChunk, StoreError};
    use askdocs_embed::{EmbedError, EmbeddingProvider};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic embedder: words are hashed into a small fixed number of
    /// buckets, so texts sharing words land near each other.
    struct BucketEmbedder;

    fn bucket_vector(text: &str) -> Vec<f32> {
        let mut buckets = [0f32; 8];
        for word in text.split_whitespace() {
            let slot = word.bytes().map(|b| b as usize).sum::<usize>() % buckets.len();
            buckets[slot] += 1.0;
        }
        buckets.to_vec()
    }

    #[async_trait]
    impl EmbeddingProvider for BucketEmbedder {
        async fn embed_text(&self, text: &str) -> askdocs_embed::Result<Vec<f32>> {
            Ok(bucket_vector(text))
        }

        async fn embed_texts(&self, texts: &[String]) -> askdocs_embed::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| bucket_vector(t)).collect())
        }

        fn dimension(&self) -> usize {
            8
        }

        fn provider_name(&self) -> &str {
            "bucket-test"
        }
    }

    /// Embedder that always fails, for degraded-path tests.
    struct BrokenEmbedder;

    #[async_trait]
    impl EmbeddingProvider for BrokenEmbedder {
        async fn embed_text(&self, _text: &str) -> askdocs_embed::Result<Vec<f32>> {
            Err(EmbedError::embedding("wires crossed"))
        }

        async fn embed_texts(&self, _texts: &[String]) -> askdocs_embed::Result<Vec<Vec<f32>>> {
            Err(EmbedError::embedding("wires crossed"))
        }

        fn dimension(&self) -> usize {
            8
        }

        fn provider_name(&self) -> &str {
            "broken-test"
        }
    }

    /// Store that counts delete calls.
    #[derive(Default)]
    struct CountingStore {
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl crate::storage::VectorStore for CountingStore {
        async fn init(&self) -> Result<(), StoreError> {
            Ok(())
        }

        async fn upsert(&self, _record: ChunkRecord) -> Result<(), StoreError> {
            Ok(())
        }

        async fn query(
            &self,
            _vector: &[f32],
            _top_k: usize,
        ) -> Result<Vec<ScoredChunk>, StoreError> {
            Ok(Vec::new())
        }

        async fn delete_one(&self, _id: &str) -> Result<(), StoreError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn writer_with(store: Arc<dyn VectorStore>, config: IndexWriterConfig) -> IndexWriter {
        IndexWriter::new(config, Arc::new(BucketEmbedder), store)
    }

    #[tokio::test]
    async fn six_hundred_words_index_as_two_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let words: Vec<String> = (0..600).map(|i| format!("word{i}")).collect();
        tokio::fs::write(&path, words.join(" ")).await.unwrap();

        let store = Arc::new(MemoryStore::new());
        let writer = writer_with(store.clone(), IndexWriterConfig::default());

        let written = writer.index_file(&path).await;

        assert_eq!(written, 2);
        assert!(store.contains("notes.txt-0").await);
        assert!(store.contains("notes.txt-1").await);
        assert!(!store.contains("notes.txt-2").await);
    }

    #[tokio::test]
    async fn empty_file_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        tokio::fs::write(&path, "   \n\t ").await.unwrap();

        let store = Arc::new(MemoryStore::new());
        let writer = writer_with(store.clone(), IndexWriterConfig::default());

        assert_eq!(writer.index_file(&path).await, 0);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn unsupported_extension_is_skipped_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        tokio::fs::write(&path, b"\x89PNG").await.unwrap();

        let store = Arc::new(MemoryStore::new());
        let writer = writer_with(store.clone(), IndexWriterConfig::default());

        assert_eq!(writer.index_file(&path).await, 0);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn embedding_failure_degrades_to_zero_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        tokio::fs::write(&path, "some words here").await.unwrap();

        let store = Arc::new(MemoryStore::new());
        let writer = IndexWriter::new(
            IndexWriterConfig::default(),
            Arc::new(BrokenEmbedder),
            store.clone(),
        );

        assert_eq!(writer.index_file(&path).await, 0);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn delete_probes_the_whole_configured_range() {
        let store = Arc::new(CountingStore::default());
        let writer = writer_with(
            store.clone(),
            IndexWriterConfig::default().with_delete_range(400, 100),
        );

        writer.delete_all_for_file("gone.txt").await;
        assert_eq!(store.deletes.load(Ordering::SeqCst), 400);
    }

    #[tokio::test]
    async fn delete_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.txt");
        tokio::fs::write(&path, "alpha beta gamma").await.unwrap();

        let store = Arc::new(MemoryStore::new());
        let writer = writer_with(
            store.clone(),
            IndexWriterConfig::default().with_delete_range(50, 10),
        );

        writer.index_file(&path).await;
        assert!(store.contains("x.txt-0").await);

        writer.delete_all_for_file("x.txt").await;
        assert!(!store.contains("x.txt-0").await);
        assert_eq!(store.len().await, 0);

        // Second pass deletes nothing and must not fail.
        writer.delete_all_for_file("x.txt").await;
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn reindex_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.txt");

        let store = Arc::new(MemoryStore::new());
        let writer = writer_with(store.clone(), IndexWriterConfig::default());

        tokio::fs::write(&path, "first version").await.unwrap();
        writer.index_file(&path).await;

        tokio::fs::write(&path, "second version").await.unwrap();
        writer.index_file(&path).await;

        assert_eq!(store.len().await, 1);
        let matches = store.query(&bucket_vector("second version"), 1).await.unwrap();
        assert_eq!(matches[0].text, "second version");
    }
}
