//! Suggested-question generation over the watched directory.
//!
//! After every settled directory change (and once at startup) the extractor
//! walks the current files, samples the head of each document, and asks the
//! completion model for candidate questions. The resulting set wholly
//! replaces the previous one; there is no incremental merge, so questions
//! about deleted documents disappear on the next pass.

use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{extract, is_ignored_file};
use crate::llm::LanguageModel;

/// Cap on the stored question set.
pub const MAX_SUGGESTED_QUESTIONS: usize = 50;
/// How much of each document feeds the generation prompt.
pub const QUESTION_SAMPLE_CHARS: usize = 1500;
/// Parsed lines at or below this many characters are discarded as noise.
const MIN_QUESTION_CHARS: usize = 6;

/// Process-scoped, capacity-bounded set of suggested questions.
///
/// Cheap to clone; all clones share the same storage. Passed into the
/// synchronizer and the serving layer explicitly so nothing reaches for a
/// global.
#[derive(Clone, Default)]
pub struct SuggestedQuestions {
    inner: Arc<RwLock<Vec<String>>>,
}

impl SuggestedQuestions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current questions, in generation order.
    pub async fn snapshot(&self) -> Vec<String> {
        self.inner.read().await.clone()
    }

    /// Replace the whole set.
    pub async fn replace(&self, questions: Vec<String>) {
        *self.inner.write().await = questions;
    }
}

/// Regenerates the suggested-question set from the live directory state.
pub struct QuestionExtractor {
    docs_dir: PathBuf,
    model: Arc<dyn LanguageModel>,
    questions: SuggestedQuestions,
    /// Strips leading "1." / "2)" style list markers.
    marker: Regex,
}

impl QuestionExtractor {
    pub fn new(
        docs_dir: PathBuf,
        model: Arc<dyn LanguageModel>,
        questions: SuggestedQuestions,
    ) -> Self {
        Self {
            docs_dir,
            model,
            questions,
            marker: Regex::new(r"^\d+[\).]\s*").expect("list marker pattern is valid"),
        }
    }

    /// Read accessor for the shared set.
    pub fn questions(&self) -> &SuggestedQuestions {
        &self.questions
    }

    /// Run one full regeneration pass.
    ///
    /// Iterates every current file, asks the model for five questions per
    /// document, and replaces the shared set with the first
    /// [`MAX_SUGGESTED_QUESTIONS`] collected. A failing document is logged
    /// and skipped; it never aborts the pass.
    pub async fn regenerate(&self) {
        let mut collected: Vec<String> = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.docs_dir).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "cannot read documents directory {}: {err}",
                    self.docs_dir.display()
                );
                return;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    warn!("error walking documents directory: {err}");
                    break;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if is_ignored_file(&name) {
                continue;
            }
            if !entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            let content = match extract::extract_text(&entry.path()).await {
                Ok(content) => content,
                Err(err) => {
                    debug!("skipping {name} during question pass: {err}");
                    continue;
                }
            };

            let sample: String = content.chars().take(QUESTION_SAMPLE_CHARS).collect();
            if sample.trim().is_empty() {
                continue;
            }

            let prompt = format!(
                "Generate 5 useful, natural questions a user might ask about this document:\n\n{sample}"
            );
            let response = match self.model.complete(&prompt).await {
                Ok(response) => response,
                Err(err) => {
                    warn!("question generation failed for {name}: {err}");
                    continue;
                }
            };

            collected.extend(self.parse_questions(&response));
        }

        collected.truncate(MAX_SUGGESTED_QUESTIONS);
        debug!("suggested questions regenerated: {} entries", collected.len());
        self.questions.replace(collected).await;
    }

    /// Parse a numbered-list completion into bare questions.
    fn parse_questions(&self, response: &str) -> Vec<String> {
        response
            .lines()
            .map(|line| self.marker.replace(line.trim(), "").trim().to_string())
            .filter(|question| question.chars().count() >= MIN_QUESTION_CHARS)
            .collect()
    }
}
