use crate::chunk::{Chunk, Metadata};
use crate::error::ChunkError;
use crate::heuristics::{matches_any, BoundaryPredicate, DEFAULT_BOUNDARIES};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

pub const DEFAULT_MIN_CHUNK_SIZE: usize = 500;
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1500;

/// Joins paragraphs inside a chunk.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("paragraph break pattern is valid"));

/// Split text into trimmed, non-empty paragraphs, in document order.
///
/// A paragraph break is any whitespace run containing a blank line. The
/// iterator is lazy and holds no state beyond `text`.
pub fn paragraphs(text: &str) -> impl Iterator<Item = &str> + '_ {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
}

pub fn validate_sizes(min_chunk_size: usize, max_chunk_size: usize) -> Result<(), ChunkError> {
    if min_chunk_size == 0 {
        return Err(ChunkError::ZeroMinChunkSize);
    }

    if min_chunk_size > max_chunk_size {
        return Err(ChunkError::InvalidSizeBounds {
            min: min_chunk_size,
            max: max_chunk_size,
        });
    }

    Ok(())
}

/// Fold state: pending paragraphs plus the chunks emitted so far.
#[derive(Default)]
struct Accumulator<'a> {
    pending: Vec<&'a str>,
    pending_size: usize,
    output: Vec<Chunk>,
}

impl<'a> Accumulator<'a> {
    fn push(mut self, paragraph: &'a str, len: usize) -> Self {
        self.pending.push(paragraph);
        self.pending_size += len;
        self
    }

    fn flush(mut self, metadata: &Metadata) -> Self {
        if !self.pending.is_empty() {
            let content = self.pending.join(PARAGRAPH_SEPARATOR);
            self.output.push(Chunk::new(content, metadata.clone()));
            self.pending.clear();
            self.pending_size = 0;
        }
        self
    }
}

/// Groups paragraphs into chunks between `min_chunk_size` and
/// `max_chunk_size` characters.
///
/// Paragraphs are never split. A chunk is closed early when it has reached the
/// minimum size and its last paragraph looks like a section boundary (see
/// [`crate::heuristics`]).
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    min_chunk_size: usize,
    max_chunk_size: usize,
    boundaries: Vec<BoundaryPredicate>,
}

impl ParagraphChunker {
    pub fn new(min_chunk_size: usize, max_chunk_size: usize) -> Result<Self, ChunkError> {
        validate_sizes(min_chunk_size, max_chunk_size)?;

        Ok(Self {
            min_chunk_size,
            max_chunk_size,
            boundaries: DEFAULT_BOUNDARIES.to_vec(),
        })
    }

    /// Add a section-boundary heuristic on top of the defaults.
    pub fn with_boundary(mut self, predicate: BoundaryPredicate) -> Self {
        self.boundaries.push(predicate);
        self
    }

    pub fn min_chunk_size(&self) -> usize {
        self.min_chunk_size
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Chunk `text`, attaching a copy of `metadata` (or an empty map) to every chunk.
    pub fn chunk(&self, text: &str, metadata: Option<&Metadata>) -> Vec<Chunk> {
        let empty = Metadata::new();
        let metadata = metadata.unwrap_or(&empty);

        let mut paragraph_count = 0usize;
        let state = paragraphs(text).fold(Accumulator::default(), |state, paragraph| {
            paragraph_count += 1;
            self.step(state, paragraph, metadata)
        });

        let chunks = state.flush(metadata).output;

        debug!(
            "Chunked {} paragraphs into {} chunks (min={}, max={})",
            paragraph_count,
            chunks.len(),
            self.min_chunk_size,
            self.max_chunk_size
        );

        chunks
    }

    fn step<'a>(
        &self,
        state: Accumulator<'a>,
        paragraph: &'a str,
        metadata: &Metadata,
    ) -> Accumulator<'a> {
        let len = paragraph.chars().count();

        // Close the pending chunk only once it is big enough to stand alone.
        let state = if state.pending_size + len > self.max_chunk_size
            && state.pending_size >= self.min_chunk_size
        {
            state.flush(metadata)
        } else {
            state
        };

        let state = state.push(paragraph, len);

        if state.pending_size >= self.min_chunk_size && matches_any(paragraph, &self.boundaries) {
            state.flush(metadata)
        } else {
            state
        }
    }
}

impl Default for ParagraphChunker {
    fn default() -> Self {
        Self {
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            boundaries: DEFAULT_BOUNDARIES.to_vec(),
        }
    }
}
