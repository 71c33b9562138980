use anyhow::Result;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,rag_ingest=debug";
const LOG_DIR: &str = "logs";

/// Stderr plus a daily-rotated `logs/ingest.<date>.log`.
///
/// Stdout is left to command output (`chunk` prints JSON lines there).
/// `RUST_LOG` sets the filter, `LOG_FORMAT=json` switches both sinks to JSON.
pub fn init_logger() -> Result<()> {
    let filter = EnvFilter::try_new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string()),
    )?;
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");

    let log_file = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("ingest")
        .filename_suffix("log")
        .build(LOG_DIR)?;

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(fmt::layer().json().with_thread_ids(true).with_writer(log_file))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(fmt::layer().with_ansi(false).with_writer(log_file))
            .init();
    }

    Ok(())
}
