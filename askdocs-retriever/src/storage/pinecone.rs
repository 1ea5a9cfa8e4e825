//! Serverless Pinecone-style HTTP vector store client.
//!
//! Control-plane calls (list/create/describe index) go to the API host and
//! run once, at [`VectorStore::init`] time: the index is created if missing
//! and described in a poll loop until it reports ready, which also yields the
//! data-plane host used by all later upsert/query/delete calls.

use super::{ChunkRecord, ScoredChunk, StoreError, VectorStore};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;

const DEFAULT_CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const READY_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Connection and provisioning settings for [`PineconeStore`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PineconeConfig {
    /// API key sent as the `Api-Key` header.
    pub api_key: String,
    /// Index to provision and use.
    pub index_name: String,
    /// Embedding dimension the index is created with.
    pub dimension: usize,
    /// Similarity metric for new indexes.
    pub metric: String,
    /// Serverless cloud provider for new indexes.
    pub cloud: String,
    /// Serverless region for new indexes.
    pub region: String,
    /// Control-plane base URL.
    pub control_plane_url: String,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            index_name: "docs".to_string(),
            dimension: 384,
            metric: "cosine".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            control_plane_url: DEFAULT_CONTROL_PLANE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexSummary>,
}

#[derive(Debug, Deserialize)]
struct IndexSummary {
    name: String,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    host: String,
    #[serde(default)]
    status: IndexStatus,
}

#[derive(Debug, Deserialize, Default)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<ChunkMetadata>,
}

#[derive(Debug, Deserialize, Default)]
struct ChunkMetadata {
    #[serde(default)]
    text: String,
}

/// HTTP client for a Pinecone-style serverless vector index.
pub struct PineconeStore {
    config: PineconeConfig,
    http: reqwest::Client,
    /// Data-plane base URL, discovered by `init`.
    host: OnceLock<String>,
}

impl PineconeStore {
    pub fn new(config: PineconeConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            host: OnceLock::new(),
        }
    }

    /// Build a store pointed at a known data-plane base URL, skipping
    /// provisioning. Used by tests against a local mock server.
    pub fn with_host(config: PineconeConfig, host: impl Into<String>) -> Self {
        let store = Self::new(config);
        let _ = store.host.set(host.into());
        store
    }

    fn data_url(&self, path: &str) -> Result<String, StoreError> {
        let host = self.host.get().ok_or(StoreError::NotReady)?;
        Ok(format!("{host}{path}"))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, StoreError> {
        let response = self
            .http
            .get(url)
            .header("Api-Key", &self.config.api_key)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, StoreError> {
        let response = self
            .http
            .post(url)
            .header("Api-Key", &self.config.api_key)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn init(&self) -> Result<(), StoreError> {
        if self.host.get().is_some() {
            return Ok(());
        }

        let control = self.config.control_plane_url.trim_end_matches('/');
        let name = &self.config.index_name;

        let existing: IndexList = self.get_json(&format!("{control}/indexes")).await?;
        if !existing.indexes.iter().any(|index| &index.name == name) {
            info!("creating vector index {name}");
            let body = json!({
                "name": name,
                "dimension": self.config.dimension,
                "metric": self.config.metric,
                "spec": {
                    "serverless": {
                        "cloud": self.config.cloud,
                        "region": self.config.region,
                    }
                }
            });
            let _: serde_json::Value = self.post_json(&format!("{control}/indexes"), &body).await?;
        }

        loop {
            let description: IndexDescription =
                self.get_json(&format!("{control}/indexes/{name}")).await?;
            if description.status.ready {
                let _ = self.host.set(format!("https://{}", description.host));
                info!("vector index {name} is ready");
                return Ok(());
            }
            info!("waiting for vector index {name} to become ready");
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    async fn upsert(&self, record: ChunkRecord) -> Result<(), StoreError> {
        let url = self.data_url("/vectors/upsert")?;
        let body = json!({
            "vectors": [{
                "id": record.id,
                "values": record.embedding,
                "metadata": { "text": record.text },
            }]
        });
        let _: serde_json::Value = self.post_json(&url, &body).await?;
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        let url = self.data_url("/query")?;
        let body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });
        let response: QueryResponse = self.post_json(&url, &body).await?;

        Ok(response
            .matches
            .into_iter()
            .map(|m| ScoredChunk {
                id: m.id,
                text: m.metadata.map(|meta| meta.text).unwrap_or_default(),
                score: m.score,
            })
            .collect())
    }

    async fn delete_one(&self, id: &str) -> Result<(), StoreError> {
        let url = self.data_url("/vectors/delete")?;
        let body = json!({ "ids": [id] });
        let _: serde_json::Value = self.post_json(&url, &body).await?;
        Ok(())
    }
}
