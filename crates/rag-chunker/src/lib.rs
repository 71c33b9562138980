//! Paragraph and table chunking for retrieval.
//!
//! Both chunkers are pure: no I/O, no shared state, one call per document or
//! table set. Size decisions are made on character counts, never tokens.

pub mod chunk;
pub mod error;
pub mod heuristics;
pub mod paragraph;
pub mod table;

pub use chunk::{Chunk, Metadata};
pub use error::ChunkError;
pub use heuristics::{BoundaryPredicate, DEFAULT_BOUNDARIES};
pub use paragraph::{paragraphs, ParagraphChunker, PARAGRAPH_SEPARATOR};
pub use table::{TableBlock, TableChunker};
