pub mod postgres;

pub use postgres::PgVectorStore;

use crate::error::StoreError;
use async_trait::async_trait;
use rag_chunker::Chunk;
use serde::Serialize;

const MAX_INDEX_NAME_LEN: usize = 45;

/// A retrieved chunk with its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub name: String,
    pub dimension: usize,
    pub chunk_count: u64,
}

/// Named collections of embedded chunks.
///
/// `upsert` is not idempotent: ingesting the same document twice stores its
/// chunks twice.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the index if it does not exist yet.
    async fn ensure_index(&self, index_name: &str) -> Result<(), StoreError>;

    /// Embed and store `chunks`; returns the number stored.
    async fn upsert(&self, index_name: &str, chunks: &[Chunk]) -> Result<usize, StoreError>;

    /// Up to `k` chunks, most similar first.
    async fn query(
        &self,
        index_name: &str,
        question: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, StoreError>;

    async fn describe_index(&self, index_name: &str) -> Result<IndexStats, StoreError>;

    async fn list_indexes(&self) -> Result<Vec<String>, StoreError>;

    /// Returns false when there was no such index.
    async fn delete_index(&self, index_name: &str) -> Result<bool, StoreError>;

    /// Returns how many indexes were removed.
    async fn delete_all_indexes(&self) -> Result<u64, StoreError>;
}

/// Index names follow the hosted vector-DB convention: 1-45 chars of
/// lowercase ASCII letters, digits and `-`, not starting or ending with `-`.
pub fn validate_index_name(name: &str) -> Result<(), StoreError> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if name.is_empty()
        || name.len() > MAX_INDEX_NAME_LEN
        || !valid_chars
        || name.starts_with('-')
        || name.ends_with('-')
    {
        return Err(StoreError::InvalidIndexName(name.to_string()));
    }

    Ok(())
}
