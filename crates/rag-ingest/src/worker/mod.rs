pub mod processor;

pub use processor::{chunk_document, ChunkSummary, DocumentProcessor, IngestReport};
