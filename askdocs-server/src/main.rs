//! askdocs: watched-folder document Q&A over a local language model.
//!
//! Bootstraps the whole pipeline: embedding model, vector store (provisioned
//! and polled until ready), index writer, directory synchronizer, suggested
//! questions, and the HTTP API.

mod config;
mod http;

use anyhow::Result;
use askdocs_embed::{EmbeddingProvider, FastEmbedProvider};
use askdocs_retriever::llm::{LanguageModel, OllamaClient};
use askdocs_retriever::retrieval::index_writer::{IndexWriter, IndexWriterConfig};
use askdocs_retriever::retrieval::pipeline::RetrievalPipeline;
use askdocs_retriever::retrieval::questions::{QuestionExtractor, SuggestedQuestions};
use askdocs_retriever::retrieval::synchronizer::{DirectorySynchronizer, SyncConfig};
use askdocs_retriever::storage::{MemoryStore, PineconeStore, VectorStore};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{Config, StoreBackend};
use http::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Watch a folder of documents and answer questions about them")]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of documents to watch (overrides the config file).
    #[arg(long)]
    docs_dir: Option<PathBuf>,

    /// Address for the HTTP API (overrides the config file).
    #[arg(long)]
    bind: Option<String>,

    /// Re-index every document already in the directory at startup.
    #[arg(long)]
    full_reindex: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_env_overrides();
    if let Some(docs_dir) = args.docs_dir {
        config.docs_dir = docs_dir;
    }
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(FastEmbedProvider::create(config.embedding.clone()).await?);

    let store: Arc<dyn VectorStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Pinecone => {
            let mut pinecone = config.store.pinecone.clone();
            pinecone.dimension = embedder.dimension();
            Arc::new(PineconeStore::new(pinecone))
        }
    };
    store.init().await?;

    let writer = Arc::new(IndexWriter::new(
        IndexWriterConfig::default()
            .with_max_chunk_words(config.index.max_chunk_words)
            .with_delete_range(config.index.delete_ceiling, config.index.delete_batch),
        embedder.clone(),
        store.clone(),
    ));

    let model: Arc<dyn LanguageModel> = Arc::new(OllamaClient::new(config.ollama.clone()));
    let questions = SuggestedQuestions::new();
    let extractor = Arc::new(QuestionExtractor::new(
        config.docs_dir.clone(),
        model.clone(),
        questions.clone(),
    ));

    let pipeline = Arc::new(
        RetrievalPipeline::new(embedder, store, model).with_top_k(config.top_k),
    );

    let synchronizer = DirectorySynchronizer::new(
        SyncConfig {
            docs_dir: config.docs_dir.clone(),
            debounce: Duration::from_millis(config.debounce_ms),
        },
        writer,
        extractor.clone(),
    );
    let _synchronizer = synchronizer.start(args.full_reindex).await?;

    // Startup question pass runs in the background so the API binds
    // immediately.
    let startup_extractor = extractor.clone();
    tokio::spawn(async move { startup_extractor.regenerate().await });

    let state = AppState {
        pipeline,
        questions,
    };
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("serving on http://{}", listener.local_addr()?);
    axum::serve(listener, http::router(state)).await?;

    Ok(())
}
