use super::{validate_index_name, IndexStats, ScoredChunk, VectorStore};
use crate::embedding::EmbeddingProvider;
use crate::error::StoreError;
use crate::pool::DbPool;
use async_trait::async_trait;
use pgvector::Vector;
use rag_chunker::{Chunk, Metadata};
use sqlx::types::Json;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::{debug, info};

const SCHEMA: [&str; 4] = [
    "CREATE EXTENSION IF NOT EXISTS vector",
    r#"CREATE TABLE IF NOT EXISTS rag_indexes (
           name        TEXT PRIMARY KEY,
           dimension   INTEGER NOT NULL,
           metric      TEXT NOT NULL DEFAULT 'cosine',
           created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
       )"#,
    r#"CREATE TABLE IF NOT EXISTS rag_chunks (
           id          BIGSERIAL PRIMARY KEY,
           index_name  TEXT NOT NULL REFERENCES rag_indexes(name) ON DELETE CASCADE,
           content     TEXT NOT NULL,
           metadata    JSONB NOT NULL DEFAULT '{}'::jsonb,
           embedding   vector NOT NULL,
           created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
       )"#,
    "CREATE INDEX IF NOT EXISTS rag_chunks_index_name_idx ON rag_chunks (index_name)",
];

#[derive(Debug, FromRow)]
struct ChunkRow {
    content: String,
    metadata: Json<Metadata>,
    similarity: f32,
}

#[derive(Debug, FromRow)]
struct IndexRow {
    name: String,
    dimension: i32,
    chunk_count: i64,
}

/// PostgreSQL + pgvector implementation of [`VectorStore`], cosine metric.
pub struct PgVectorStore {
    pool: DbPool,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl PgVectorStore {
    pub fn new(pool: DbPool, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { pool, embedder }
    }

    /// Create the extension, tables and lookup index if missing.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(self.pool.get_pool()).await?;
        }

        debug!("Vector store schema ready");
        Ok(())
    }

    async fn index_dimension(&self, index_name: &str) -> Result<Option<usize>, StoreError> {
        let dimension = sqlx::query_scalar::<_, i32>(
            "SELECT dimension FROM rag_indexes WHERE name = $1",
        )
        .bind(index_name)
        .fetch_optional(self.pool.get_pool())
        .await?;

        Ok(dimension.map(|d| d as usize))
    }

    /// The index must exist and match the embedder's dimension.
    async fn require_index(&self, index_name: &str) -> Result<(), StoreError> {
        validate_index_name(index_name)?;

        let dimension = self
            .index_dimension(index_name)
            .await?
            .ok_or_else(|| StoreError::IndexNotFound(index_name.to_string()))?;

        if dimension != self.embedder.dimension() {
            return Err(StoreError::DimensionMismatch {
                expected: dimension,
                actual: self.embedder.dimension(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn ensure_index(&self, index_name: &str) -> Result<(), StoreError> {
        validate_index_name(index_name)?;

        let result = sqlx::query(
            r#"INSERT INTO rag_indexes (name, dimension, metric)
               VALUES ($1, $2, 'cosine')
               ON CONFLICT (name) DO NOTHING"#,
        )
        .bind(index_name)
        .bind(self.embedder.dimension() as i32)
        .execute(self.pool.get_pool())
        .await?;

        if result.rows_affected() > 0 {
            info!(
                "Created index '{}' (dimension {}, cosine)",
                index_name,
                self.embedder.dimension()
            );
        } else {
            debug!("Index '{}' already exists", index_name);
        }

        self.require_index(index_name).await
    }

    async fn upsert(&self, index_name: &str, chunks: &[Chunk]) -> Result<usize, StoreError> {
        self.require_index(index_name).await?;

        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(StoreError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut transaction = self.pool.get_pool().begin().await?;

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            sqlx::query(
                r#"INSERT INTO rag_chunks (index_name, content, metadata, embedding)
                   VALUES ($1, $2, $3, $4)"#,
            )
            .bind(index_name)
            .bind(&chunk.content)
            .bind(Json(&chunk.metadata))
            .bind(Vector::from(embedding))
            .execute(&mut *transaction)
            .await?;
        }

        transaction.commit().await?;
        debug!("Inserted {} chunks into '{}'", chunks.len(), index_name);

        Ok(chunks.len())
    }

    async fn query(
        &self,
        index_name: &str,
        question: &str,
        k: usize,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        self.require_index(index_name).await?;

        let embedding = self.embedder.embed_single(question).await?;

        let rows = sqlx::query_as::<_, ChunkRow>(
            r#"SELECT content,
                      metadata,
                      (1 - (embedding <=> $2))::real AS similarity
               FROM rag_chunks
               WHERE index_name = $1
               ORDER BY embedding <=> $2
               LIMIT $3"#,
        )
        .bind(index_name)
        .bind(Vector::from(embedding))
        .bind(k as i64)
        .fetch_all(self.pool.get_pool())
        .await?;

        debug!("Found {} chunks in '{}' for query", rows.len(), index_name);

        Ok(rows
            .into_iter()
            .map(|row| ScoredChunk {
                chunk: Chunk::new(row.content, row.metadata.0),
                similarity: row.similarity,
            })
            .collect())
    }

    async fn describe_index(&self, index_name: &str) -> Result<IndexStats, StoreError> {
        validate_index_name(index_name)?;

        let row = sqlx::query_as::<_, IndexRow>(
            r#"SELECT i.name,
                      i.dimension,
                      COUNT(c.id) AS chunk_count
               FROM rag_indexes i
               LEFT JOIN rag_chunks c ON c.index_name = i.name
               WHERE i.name = $1
               GROUP BY i.name, i.dimension"#,
        )
        .bind(index_name)
        .fetch_optional(self.pool.get_pool())
        .await?
        .ok_or_else(|| StoreError::IndexNotFound(index_name.to_string()))?;

        Ok(IndexStats {
            name: row.name,
            dimension: row.dimension as usize,
            chunk_count: row.chunk_count as u64,
        })
    }

    async fn list_indexes(&self) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar::<_, String>("SELECT name FROM rag_indexes ORDER BY name")
            .fetch_all(self.pool.get_pool())
            .await?;

        Ok(names)
    }

    async fn delete_index(&self, index_name: &str) -> Result<bool, StoreError> {
        validate_index_name(index_name)?;

        let result = sqlx::query("DELETE FROM rag_indexes WHERE name = $1")
            .bind(index_name)
            .execute(self.pool.get_pool())
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted index '{}'", index_name);
        }

        Ok(deleted)
    }

    async fn delete_all_indexes(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM rag_indexes")
            .execute(self.pool.get_pool())
            .await?;

        info!("Deleted {} indexes", result.rows_affected());
        Ok(result.rows_affected())
    }
}
