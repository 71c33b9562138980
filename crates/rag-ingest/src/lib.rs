//! Document loading and ingestion into the vector store.

pub mod config;
pub mod document;
pub mod utils;
pub mod worker;

pub use config::Settings;
pub use utils::error::WorkerError;
pub use worker::{DocumentProcessor, IngestReport};
