//! Retrieval-augmented question answering over a vector index.

pub mod config;
pub mod handlers;
pub mod services;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use rag_store::DbPool;
use services::RagService;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

pub fn build_router(rag_service: Arc<RagService>, db_pool: DbPool, body_limit_kb: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .route("/api/ask", post(handlers::ask::ask_handler))
        .layer(Extension(rag_service))
        .layer(Extension(db_pool))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(DefaultBodyLimit::max(body_limit_kb * 1024))
}
