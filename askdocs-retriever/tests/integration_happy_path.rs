//! End-to-end pipeline tests over the public API: index a directory's files,
//! answer questions against the same store, and converge after deletions.

use askdocs_embed::EmbeddingProvider;
use askdocs_retriever::llm::{LanguageModel, LlmError};
use askdocs_retriever::retrieval::index_writer::{IndexWriter, IndexWriterConfig};
use askdocs_retriever::retrieval::pipeline::{
    NO_CONTEXT_ANSWER, RetrievalPipeline,
};
use askdocs_retriever::storage::{MemoryStore, VectorStore};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

/// Deterministic keyword embedder: each axis tracks one topic word, so texts
/// about "alpha" and "omega" are orthogonal and retrieval order is exact.
struct KeywordEmbedder;

fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    vec![
        lower.contains("alpha") as u8 as f32,
        lower.contains("omega") as u8 as f32,
    ]
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed_text(&self, text: &str) -> askdocs_embed::Result<Vec<f32>> {
        Ok(keyword_vector(text))
    }

    async fn embed_texts(&self, texts: &[String]) -> askdocs_embed::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        2
    }

    fn provider_name(&self) -> &str {
        "keyword-test"
    }
}

/// Echoes the prompt back so tests can check grounding, prefixed so the
/// trimmed completion is distinguishable from fixed messages.
struct EchoModel {
    prompts: Mutex<Vec<String>>,
}

impl EchoModel {
    fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LanguageModel for EchoModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(format!("grounded answer from: {prompt}"))
    }
}

struct Pipeline {
    store: Arc<MemoryStore>,
    writer: IndexWriter,
    pipeline: RetrievalPipeline,
    model: Arc<EchoModel>,
}

fn pipeline() -> Pipeline {
    let store = Arc::new(MemoryStore::new());
    let embedder = Arc::new(KeywordEmbedder);
    let model = Arc::new(EchoModel::new());

    let writer = IndexWriter::new(
        IndexWriterConfig::default().with_delete_range(100, 25),
        embedder.clone(),
        store.clone(),
    );
    let retrieval = RetrievalPipeline::new(embedder, store.clone(), model.clone());

    Pipeline {
        store,
        writer,
        pipeline: retrieval,
        model,
    }
}

#[tokio::test]
async fn scenario_a_600_words_become_two_addressed_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    let words: Vec<String> = (0..600).map(|i| format!("alpha{i}")).collect();
    tokio::fs::write(&path, words.join(" ")).await.unwrap();

    let p = pipeline();
    let written = p.writer.index_file(&path).await;

    assert_eq!(written, 2);
    assert!(p.store.contains("notes.txt-0").await);
    assert!(p.store.contains("notes.txt-1").await);

    // 500-word head, 100-word tail.
    let matches = p.store.query(&[1.0, 0.0], 2).await.unwrap();
    let head = matches.iter().find(|m| m.id == "notes.txt-0").unwrap();
    let tail = matches.iter().find(|m| m.id == "notes.txt-1").unwrap();
    assert_eq!(head.text.split_whitespace().count(), 500);
    assert_eq!(tail.text.split_whitespace().count(), 100);
}

#[tokio::test]
async fn scenario_b_answer_is_grounded_in_the_matching_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    let other = dir.path().join("other.txt");
    tokio::fs::write(&notes, "Alpha is the first letter of the Greek alphabet.")
        .await
        .unwrap();
    tokio::fs::write(&other, "Omega is the last letter.").await.unwrap();

    let p = pipeline();
    p.writer.index_file(&notes).await;
    p.writer.index_file(&other).await;

    let answer = p.pipeline.answer("What is Alpha?").await;

    assert!(answer.contains("Alpha is the first letter"));
    let prompts = p.model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Alpha is the first letter of the Greek alphabet."));
    assert!(prompts[0].contains("Question: What is Alpha?"));
}

#[tokio::test]
async fn scenario_c_deletion_removes_all_matches_for_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    tokio::fs::write(&path, "Alpha facts live here.").await.unwrap();

    let p = pipeline();
    p.writer.index_file(&path).await;
    assert!(p.store.contains("notes.txt-0").await);

    p.writer.delete_all_for_file("notes.txt").await;

    assert!(!p.store.contains("notes.txt-0").await);
    let answer = p.pipeline.answer("What is Alpha?").await;
    assert_eq!(answer, NO_CONTEXT_ANSWER);
    assert!(p.model.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unsupported_and_empty_files_never_reach_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("photo.jpg");
    let blank = dir.path().join("blank.txt");
    tokio::fs::write(&image, b"\xff\xd8\xff").await.unwrap();
    tokio::fs::write(&blank, "   ").await.unwrap();

    let p = pipeline();
    assert_eq!(p.writer.index_file(&image).await, 0);
    assert_eq!(p.writer.index_file(&blank).await, 0);
    assert_eq!(p.store.len().await, 0);
}
