//! Language-model completion seam and the Ollama HTTP client.
//!
//! Completions are plain request/response: one prompt string in, one text
//! out. Streaming is deliberately not used; the retrieval pipeline returns
//! whole answers.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";
/// Default completion model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// Errors from completion calls.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The model host could not be reached or the transfer failed.
    #[error("language model transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The model host answered with a non-success status.
    #[error("language model returned status {status}")]
    Api { status: u16 },
}

/// Narrow seam over the completion model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Produce a completion for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Host and model selection for [`OllamaClient`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Client for Ollama's `/api/generate` endpoint.
pub struct OllamaClient {
    config: OllamaConfig,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.config.host.trim_end_matches('/'));
        let body = json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
        });

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
            });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn complete_posts_prompt_and_returns_response_field() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .json_body_partial(r#"{ "model": "llama3", "stream": false }"#);
                then.status(200)
                    .json_body(serde_json::json!({ "response": "42", "done": true }));
            })
            .await;

        let client = OllamaClient::new(OllamaConfig {
            host: server.base_url(),
            model: "llama3".to_string(),
        });
        let answer = client.complete("what is the answer?").await.unwrap();

        assert_eq!(answer, "42");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("model exploded");
            })
            .await;

        let client = OllamaClient::new(OllamaConfig {
            host: server.base_url(),
            model: "llama3".to_string(),
        });
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 500 }));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let client = OllamaClient::new(OllamaConfig {
            // Port 9 (discard) is essentially never listening locally.
            host: "http://127.0.0.1:9".to_string(),
            model: "llama3".to_string(),
        });
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }
}
