//! Question answering over the indexed chunks.
//!
//! The read path never returns an error to its caller: every failure mode
//! collapses to a fixed textual answer so the serving layer has nothing to
//! handle. Empty retrieval short-circuits before the language model is
//! invoked at all.

use askdocs_embed::EmbeddingProvider;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::llm::LanguageModel;
use crate::storage::VectorStore;

/// Default number of nearest chunks pulled into the prompt context.
pub const DEFAULT_TOP_K: usize = 3;

/// Answer returned when retrieval produced no context. The language model is
/// not consulted in that case.
pub const NO_CONTEXT_ANSWER: &str = "No relevant context found in the indexed documents.";

/// Answer returned when the language model cannot be reached.
pub const MODEL_UNREACHABLE_ANSWER: &str =
    "The language model is not reachable. Check that it is running and try again.";

/// The read half of the pipeline: embeds a question, retrieves nearest
/// chunks, and drives the completion model.
pub struct RetrievalPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    model: Arc<dyn LanguageModel>,
    top_k: usize,
}

impl RetrievalPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            embedder,
            store,
            model,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Override how many nearest chunks feed the prompt.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Answer `question` from the indexed documents.
    ///
    /// Infallible by contract: retrieval failures are treated as an empty
    /// context, and a failed completion call yields the fixed unreachable
    /// message instead of an error.
    pub async fn answer(&self, question: &str) -> String {
        let context = self.retrieve_context(question).await;
        if context.is_empty() {
            debug!("no context retrieved, skipping completion");
            return NO_CONTEXT_ANSWER.to_string();
        }

        let prompt = build_prompt(&context, question);
        match self.model.complete(&prompt).await {
            Ok(completion) => completion.trim().to_string(),
            Err(err) => {
                warn!("completion failed: {err}");
                MODEL_UNREACHABLE_ANSWER.to_string()
            }
        }
    }

    /// Embed the question and join the nearest chunk texts, newline
    /// separated, in the store's rank order. Any failure yields an empty
    /// context.
    async fn retrieve_context(&self, question: &str) -> String {
        let vector = match self.embedder.embed_text(question).await {
            Ok(vector) => vector,
            Err(err) => {
                warn!("failed to embed question: {err}");
                return String::new();
            }
        };

        let matches = match self.store.query(&vector, self.top_k).await {
            Ok(matches) => matches,
            Err(err) => {
                warn!("vector query failed: {err}");
                return String::new();
            }
        };

        matches
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The fixed instructional prompt wrapping retrieved context and question.
fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are an assistant. Use ONLY the context below to answer the question.\n\
         Format the answer in **Markdown** (with bullet points, headings, and bold where useful).\n\
         If the context is not enough, say 'No relevant context found.'\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer (in Markdown):"
    )
}
