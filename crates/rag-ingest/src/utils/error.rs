use rag_chunker::ChunkError;
use rag_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Path is not a file: {0}")]
    NotAFile(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File too large: {0} MB (max: {1} MB)")]
    FileTooLarge(u64, u64),

    #[error("Parsing error: {0}")]
    ParsingError(String),

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Chunking error: {0}")]
    Chunking(#[from] ChunkError),

    #[error("Vector store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<lopdf::Error> for WorkerError {
    fn from(err: lopdf::Error) -> Self {
        WorkerError::ParsingError(format!("PDF: {}", err))
    }
}

impl From<calamine::Error> for WorkerError {
    fn from(err: calamine::Error) -> Self {
        WorkerError::ParsingError(format!("Spreadsheet: {}", err))
    }
}
