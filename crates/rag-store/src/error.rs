use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid index name '{0}': use 1-45 lowercase letters, digits or '-', starting and ending with a letter or digit")]
    InvalidIndexName(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),
}
