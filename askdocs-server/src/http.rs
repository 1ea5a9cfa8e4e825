//! HTTP API over the retrieval pipeline.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Liveness line |
//! | `POST` | `/ask` | Answer a question from the indexed documents |
//! | `GET`  | `/suggested` | Current suggested-question set |
//!
//! `/ask` never surfaces pipeline failures: degraded answers come back as
//! regular 200 responses with a fixed message in `answer`. The only error
//! response is 400 for a blank question.

use askdocs_retriever::retrieval::pipeline::RetrievalPipeline;
use askdocs_retriever::retrieval::questions::SuggestedQuestions;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RetrievalPipeline>,
    pub questions: SuggestedQuestions,
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Debug, Serialize)]
struct AskResponse {
    answer: String,
}

#[derive(Debug, Serialize)]
struct SuggestedResponse {
    questions: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/ask", post(ask))
        .route("/suggested", get(suggested))
        .layer(cors)
        .with_state(state)
}

async fn root() -> &'static str {
    "askdocs backend is running. POST /ask to query your documents."
}

async fn ask(State(state): State<AppState>, Json(request): Json<AskRequest>) -> Response {
    let question = request.question.trim();
    if question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "question must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    let answer = state.pipeline.answer(question).await;
    Json(AskResponse { answer }).into_response()
}

async fn suggested(State(state): State<AppState>) -> Json<SuggestedResponse> {
    Json(SuggestedResponse {
        questions: state.questions.snapshot().await,
    })
}
