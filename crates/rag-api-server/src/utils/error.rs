use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rag_store::StoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Vector store error: {0}")]
    Store(#[from] StoreError),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ApiError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::Store(StoreError::IndexNotFound(_)) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::Store(StoreError::Database(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "DatabaseError")
            }
            ApiError::Store(StoreError::Http(_)) | ApiError::Store(StoreError::Embedding(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "EmbeddingError")
            }
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "StoreError"),
            ApiError::LlmError(_) => (StatusCode::SERVICE_UNAVAILABLE, "LlmError"),
            ApiError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::BadRequest("empty".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::Store(StoreError::IndexNotFound("x".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Store(StoreError::Embedding("bad".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::Store(StoreError::DimensionMismatch {
                    expected: 1536,
                    actual: 384,
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::LlmError("down".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
