use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// JSON logs by default; `LOG_FORMAT=pretty` for development.
pub fn init_logger() -> Result<()> {
    let log_level =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,rag_api_server=debug".to_string());
    let filter = EnvFilter::try_new(&log_level)?;

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    match log_format.as_str() {
        "pretty" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_target(true))
            .init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init(),
    }

    Ok(())
}
