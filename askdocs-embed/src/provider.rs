//! Embedding provider implementations

use crate::config::EmbedConfig;
use crate::error::{EmbedError, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};

/// Trait for components that turn text into fixed-length vectors.
///
/// The indexing and retrieval pipelines consume this trait only; the concrete
/// model runtime stays an implementation detail of this crate (tests supply
/// deterministic fakes).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Dimension of the vectors this provider produces.
    fn dimension(&self) -> usize;

    /// Human-readable provider/model identifier for logs.
    fn provider_name(&self) -> &str;
}

fn resolve_model(name: &str) -> Result<(EmbeddingModel, usize)> {
    match name {
        "all-minilm-l12-v2" => Ok((EmbeddingModel::AllMiniLML12V2, 384)),
        "all-minilm-l6-v2" => Ok((EmbeddingModel::AllMiniLML6V2, 384)),
        other => Err(EmbedError::UnknownModel {
            name: other.to_string(),
        }),
    }
}

/// FastEmbed-backed provider running a local ONNX model.
///
/// The model handle is shared behind a mutex; inference runs on the blocking
/// thread pool so embedding calls never stall the async runtime.
#[derive(Clone)]
pub struct FastEmbedProvider {
    config: EmbedConfig,
    model: Arc<Mutex<TextEmbedding>>,
    dimension: usize,
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("config", &self.config)
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl FastEmbedProvider {
    /// Download (if necessary) and load the configured model.
    pub async fn create(config: EmbedConfig) -> Result<Self> {
        let (model_kind, dimension) = resolve_model(&config.model_name)?;
        tracing::info!("loading embedding model: {}", config.model_name);

        let mut options =
            InitOptions::new(model_kind).with_show_download_progress(config.show_download_progress);
        if let Some(dir) = &config.cache_dir {
            options = options.with_cache_dir(dir.clone());
        }

        let model = tokio::task::spawn_blocking(move || {
            TextEmbedding::try_new(options).map_err(EmbedError::model_init)
        })
        .await??;

        Ok(Self {
            config,
            model: Arc::new(Mutex::new(model)),
            dimension,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed_texts(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbedError::embedding("model returned no vector"))
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let batch_size = self.config.batch_size;
        let texts = texts.to_vec();

        let embeddings = tokio::task::spawn_blocking(move || {
            let mut guard = model
                .lock()
                .map_err(|_| EmbedError::embedding("embedding model mutex poisoned"))?;
            guard
                .embed(texts, Some(batch_size))
                .map_err(EmbedError::embedding)
        })
        .await??;

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &str {
        &self.config.model_name
    }
}
