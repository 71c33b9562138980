use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    #[error("min_chunk_size must be greater than zero")]
    ZeroMinChunkSize,

    #[error("min_chunk_size ({min}) must not exceed max_chunk_size ({max})")]
    InvalidSizeBounds { min: usize, max: usize },

    #[error("overlap ({overlap}) must be smaller than max_rows ({max_rows})")]
    InvalidOverlap { max_rows: usize, overlap: usize },
}
