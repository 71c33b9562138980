use crate::chunk::{Chunk, Metadata};
use crate::error::ChunkError;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_MAX_ROWS: usize = 20;
pub const DEFAULT_OVERLAP: usize = 2;

/// A header plus rows that share its columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableBlock {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }
}

/// Splits tables into overlapping row windows, repeating the header in every
/// window so each chunk reads on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableChunker {
    max_rows: usize,
    overlap: usize,
}

impl TableChunker {
    pub fn new(max_rows: usize, overlap: usize) -> Result<Self, ChunkError> {
        if overlap >= max_rows {
            return Err(ChunkError::InvalidOverlap { max_rows, overlap });
        }

        Ok(Self { max_rows, overlap })
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Row advance between consecutive windows; always at least 1.
    pub fn stride(&self) -> usize {
        self.max_rows - self.overlap
    }

    /// Chunk texts for every block, in block order.
    pub fn chunk(&self, tables: &[TableBlock]) -> Vec<String> {
        let chunks: Vec<String> = tables
            .iter()
            .flat_map(|table| self.chunk_block(table))
            .collect();

        debug!(
            "Chunked {} tables into {} chunks (max_rows={}, overlap={})",
            tables.len(),
            chunks.len(),
            self.max_rows,
            self.overlap
        );

        chunks
    }

    /// Windows start at `0, stride, 2 * stride, ...`; the last one may be short.
    pub fn chunk_block(&self, table: &TableBlock) -> Vec<String> {
        let header = render_row(&table.header);
        let total = table.rows.len();

        (0..total)
            .step_by(self.stride())
            .map(|start| {
                let end = (start + self.max_rows).min(total);
                let lines: Vec<String> = std::iter::once(header.clone())
                    .chain(table.rows[start..end].iter().map(|row| render_row(row)))
                    .collect();

                lines.join("\n").trim().to_string()
            })
            .collect()
    }

    /// Same as [`TableChunker::chunk`], with a copy of `metadata` on each chunk.
    pub fn chunk_with_metadata(&self, tables: &[TableBlock], metadata: &Metadata) -> Vec<Chunk> {
        self.chunk(tables)
            .into_iter()
            .map(|content| Chunk::new(content, metadata.clone()))
            .collect()
    }
}

impl Default for TableChunker {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

fn render_row(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| cell.trim())
        .collect::<Vec<_>>()
        .join(",")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn numbered_rows(count: usize) -> Vec<Vec<String>> {
        (0..count)
            .map(|i| vec![format!("r{}", i), format!("{}", i * 10)])
            .collect()
    }

    #[test]
    fn test_rejects_non_advancing_stride() {
        assert_eq!(
            TableChunker::new(3, 3).unwrap_err(),
            ChunkError::InvalidOverlap { max_rows: 3, overlap: 3 }
        );
        assert!(TableChunker::new(3, 5).is_err());
        assert!(TableChunker::new(0, 0).is_err());
        assert_eq!(TableChunker::new(3, 2).unwrap().stride(), 1);
    }

    #[test]
    fn test_windows_with_overlap() {
        let chunker = TableChunker::new(4, 1).unwrap();
        let table = TableBlock::new(row(&["a", "b"]), numbered_rows(10));
        let chunks = chunker.chunk(&[table]);

        assert_eq!(chunks.len(), 4);
        for chunk in &chunks {
            assert_eq!(chunk.lines().next(), Some("a,b"));
        }

        let first_rows: Vec<&str> = chunks
            .iter()
            .map(|c| c.lines().nth(1).unwrap())
            .collect();
        assert_eq!(first_rows, vec!["r0,0", "r3,30", "r6,60", "r9,90"]);

        assert_eq!(chunks[0].lines().count(), 5);
        assert_eq!(chunks[3], "a,b\nr9,90");
    }

    #[test]
    fn test_overlap_rows_repeat() {
        let chunker = TableChunker::new(3, 1).unwrap();
        let table = TableBlock::new(row(&["day"]), numbered_rows(5));
        let chunks = chunker.chunk_block(&table);

        // stride 2 over 5 rows: windows at 0, 2, 4
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].lines().last(), Some("r2,20"));
        assert_eq!(chunks[1].lines().nth(1), Some("r2,20"));
        assert_eq!(chunks[2], "day\nr4,40");
    }

    #[test]
    fn test_short_last_window_without_overlap() {
        let chunker = TableChunker::new(4, 0).unwrap();
        let table = TableBlock::new(row(&["h"]), numbered_rows(6));
        let chunks = chunker.chunk_block(&table);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].lines().count(), 3);
    }

    #[test]
    fn test_cells_are_trimmed() {
        let chunker = TableChunker::default();
        let table = TableBlock::new(
            row(&[" Meal ", "kcal "]),
            vec![row(&["  Breakfast", " 450 "])],
        );

        assert_eq!(chunker.chunk(&[table]), vec!["Meal,kcal\nBreakfast,450"]);
    }

    #[test]
    fn test_empty_table_yields_nothing() {
        let chunker = TableChunker::default();
        let table = TableBlock::new(row(&["a"]), Vec::new());
        assert!(chunker.chunk(&[table]).is_empty());
        assert!(chunker.chunk(&[]).is_empty());
    }

    #[test]
    fn test_blocks_keep_their_own_header() {
        let chunker = TableChunker::new(2, 0).unwrap();
        let tables = vec![
            TableBlock::new(row(&["x"]), vec![row(&["1"])]),
            TableBlock::new(row(&["y"]), vec![row(&["2"]), row(&["3"]), row(&["4"])]),
        ];

        assert_eq!(chunker.chunk(&tables), vec!["x\n1", "y\n2\n3", "y\n4"]);
    }

    #[test]
    fn test_chunk_with_metadata() {
        let chunker = TableChunker::default();
        let mut metadata = Metadata::new();
        metadata.insert("sheet".to_string(), json!("Week 1"));

        let table = TableBlock::new(row(&["a"]), vec![row(&["1"])]);
        let chunks = chunker.chunk_with_metadata(&[table], &metadata);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata, metadata);
    }
}
