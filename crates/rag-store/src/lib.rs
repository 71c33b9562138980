//! Vector store gateway: embeds chunks, persists them in a named index and
//! retrieves them by cosine similarity.

pub mod config;
pub mod embedding;
pub mod error;
pub mod pool;
pub mod store;

pub use config::{DatabaseConfig, EmbeddingConfig};
pub use embedding::{EmbeddingProvider, HttpEmbeddingClient};
pub use error::StoreError;
pub use pool::DbPool;
pub use store::{validate_index_name, IndexStats, PgVectorStore, ScoredChunk, VectorStore};
