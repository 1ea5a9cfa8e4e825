//! Error types for the embedding system

/// Result type for embedding operations.
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Error type covering model selection, initialization, and inference.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// The configured model name is not one this crate knows how to load.
    #[error("unknown embedding model: {name}")]
    UnknownModel { name: String },

    /// Error while downloading or loading the model.
    #[error("embedding model initialization failed: {message}")]
    ModelInit { message: String },

    /// Error during embedding generation.
    #[error("embedding generation failed: {message}")]
    Embedding { message: String },

    /// The blocking embedding task panicked or was cancelled.
    #[error("embedding task failed: {source}")]
    AsyncTask {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl EmbedError {
    /// Wrap an arbitrary error as an embedding-generation failure.
    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        Self::Embedding {
            message: err.to_string(),
        }
    }

    /// Wrap an arbitrary error as a model-initialization failure.
    pub fn model_init<E: std::fmt::Display>(err: E) -> Self {
        Self::ModelInit {
            message: err.to_string(),
        }
    }
}
