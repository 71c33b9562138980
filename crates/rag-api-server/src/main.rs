use anyhow::Result;
use rag_api_server::build_router;
use rag_api_server::config::Settings;
use rag_api_server::services::{LlmService, RagService};
use rag_api_server::utils::logger::init_logger;
use rag_store::{DbPool, HttpEmbeddingClient, PgVectorStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger()?;

    info!("🚀 Starting RAG API Server...");

    let settings = Settings::load()?;
    info!("✅ Configuration loaded");

    let db_pool = DbPool::new(&settings.database).await?;
    info!("✅ Database connection established");

    let embedder = Arc::new(HttpEmbeddingClient::new(settings.embedding.clone())?);
    let store = PgVectorStore::new(db_pool.clone(), embedder);
    store.migrate().await?;

    let llm_service = Arc::new(LlmService::new(settings.llm.clone())?);

    let rag_service = Arc::new(RagService::new(
        Arc::new(store),
        llm_service,
        settings.prompts.prompt_template()?,
        settings.prompts.output_language.clone(),
        settings.rag.clone(),
    ));

    let app = build_router(rag_service, db_pool.clone(), settings.server.body_limit_kb);

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
