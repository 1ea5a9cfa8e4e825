//! In-memory store for testing and development.

use super::{ChunkRecord, ScoredChunk, StoreError, VectorStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Brute-force cosine-similarity store backed by a `HashMap`.
///
/// Keeps every record in memory and scans all of them per query. Not meant
/// for large corpora; it exists so the pipeline can run and be tested without
/// a provisioned cloud index.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, ChunkRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether a record with `id` exists.
    pub async fn contains(&self, id: &str) -> bool {
        self.records.read().await.contains_key(id)
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn init(&self) -> Result<(), StoreError> {
        debug!("memory store ready");
        Ok(())
    }

    async fn upsert(&self, record: ChunkRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(record.id.clone(), record);
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        let records = self.records.read().await;

        let mut scored: Vec<ScoredChunk> = records
            .values()
            .map(|record| ScoredChunk {
                id: record.id.clone(),
                text: record.text.clone(),
                score: Self::cosine_similarity(vector, &record.embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete_one(&self, id: &str) -> Result<(), StoreError> {
        self.records.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, embedding: Vec<f32>, text: &str) -> ChunkRecord {
        ChunkRecord {
            id: id.to_string(),
            embedding,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_overwrites_by_id() {
        let store = MemoryStore::new();
        store.upsert(record("a-0", vec![1.0, 0.0], "old")).await.unwrap();
        store.upsert(record("a-0", vec![1.0, 0.0], "new")).await.unwrap();

        assert_eq!(store.len().await, 1);
        let matches = store.query(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(matches[0].text, "new");
    }

    #[tokio::test]
    async fn query_orders_by_similarity() {
        let store = MemoryStore::new();
        store.upsert(record("x-0", vec![1.0, 0.0], "east")).await.unwrap();
        store.upsert(record("y-0", vec![0.0, 1.0], "north")).await.unwrap();
        store.upsert(record("z-0", vec![0.7, 0.7], "northeast")).await.unwrap();

        let matches = store.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "x-0");
        assert_eq!(matches[1].id, "z-0");
    }

    #[tokio::test]
    async fn query_on_empty_store_returns_nothing() {
        let store = MemoryStore::new();
        assert!(store.query(&[1.0], 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_id_is_a_no_op() {
        let store = MemoryStore::new();
        store.delete_one("ghost-0").await.unwrap();
        store.delete_one("ghost-0").await.unwrap();
    }

    #[tokio::test]
    async fn mismatched_dimensions_score_zero() {
        assert_eq!(MemoryStore::cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(MemoryStore::cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
