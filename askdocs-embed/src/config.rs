//! Configuration for embedding models

use serde::Deserialize;
use std::path::PathBuf;

/// Default embedding model. Matches the reference deployment
/// (all-MiniLM-L12-v2, 384-dimensional vectors).
pub const DEFAULT_MODEL_NAME: &str = "all-minilm-l12-v2";

/// Configuration for the local embedding provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Name of the embedding model to load. Supported:
    /// `all-minilm-l12-v2`, `all-minilm-l6-v2`.
    pub model_name: String,
    /// Directory for downloaded model files. `None` uses the fastembed
    /// default cache location.
    pub cache_dir: Option<PathBuf>,
    /// Batch size for multi-text embedding calls.
    pub batch_size: usize,
    /// Whether to print a progress bar while downloading model files.
    pub show_download_progress: bool,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            cache_dir: None,
            batch_size: 32,
            show_download_progress: false,
        }
    }
}

impl EmbedConfig {
    /// Create a configuration for the named model.
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Self::default()
        }
    }

    /// Set the model cache directory.
    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = Some(dir);
        self
    }

    /// Set the embedding batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}
