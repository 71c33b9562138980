use crate::services::RagService;
use crate::utils::error::ApiError;
use axum::{extract::Extension, Json};
use rag_chunker::Metadata;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub session_id: String,
    pub sources: Vec<SourceInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SourceInfo {
    pub preview: String, // first 200 chars
    pub metadata: Metadata,
    pub similarity: f32,
}

pub async fn ask_handler(
    Extension(rag_service): Extension<Arc<RagService>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }

    let session_id = request
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    info!("Ask request in session {}", session_id);

    let answer = rag_service.ask(question).await?;

    let sources = answer
        .sources
        .into_iter()
        .map(|scored| SourceInfo {
            preview: scored.chunk.content.chars().take(PREVIEW_CHARS).collect(),
            metadata: scored.chunk.metadata,
            similarity: scored.similarity,
        })
        .collect();

    Ok(Json(AskResponse {
        answer: answer.text,
        session_id,
        sources,
    }))
}
