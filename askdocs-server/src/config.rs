//! Server configuration: TOML file with environment overrides.
//!
//! Every field has a default, so an empty (or absent) config file yields a
//! working local setup: memory vector store, Ollama on localhost, `./docs`
//! watched. Secrets and host addresses can be supplied via environment
//! variables (`PINECONE_API_KEY`, `OLLAMA_HOST`, `OLLAMA_MODEL`) so they stay
//! out of the file.

use anyhow::{Context, Result};
use askdocs_embed::EmbedConfig;
use askdocs_retriever::llm::OllamaConfig;
use askdocs_retriever::storage::PineconeConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file consulted when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "askdocs.toml";

/// Which vector store backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process brute-force store; index is rebuilt on restart.
    Memory,
    /// Serverless Pinecone-style HTTP index.
    Pinecone,
}

/// Vector store selection plus backend-specific settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub pinecone: PineconeConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            pinecone: PineconeConfig::default(),
        }
    }
}

/// Write-path tuning mirrored into the index writer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub max_chunk_words: usize,
    pub delete_ceiling: usize,
    pub delete_batch: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_chunk_words: 500,
            delete_ceiling: 10_000,
            delete_batch: 200,
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of documents to watch and index.
    pub docs_dir: PathBuf,
    /// Address the HTTP API binds to.
    pub bind: String,
    /// Per-file debounce window in milliseconds.
    pub debounce_ms: u64,
    /// Nearest chunks fed into each answer prompt.
    pub top_k: usize,
    pub index: IndexConfig,
    pub embedding: EmbedConfig,
    pub ollama: OllamaConfig,
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("./docs"),
            bind: "127.0.0.1:4000".to_string(),
            debounce_ms: 500,
            top_k: 3,
            index: IndexConfig::default(),
            embedding: EmbedConfig::default(),
            ollama: OllamaConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `askdocs.toml` if present, or
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Apply environment variable overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            self.ollama.host = host;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            self.ollama.model = model;
        }
        if let Ok(key) = std::env::var("PINECONE_API_KEY") {
            self.store.pinecone.api_key = key;
        }
    }
}
