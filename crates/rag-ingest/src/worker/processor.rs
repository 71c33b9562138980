use crate::config::Settings;
use crate::document::{DocumentLoader, LoadedDocument};
use crate::utils::error::WorkerError;
use rag_chunker::{Chunk, ParagraphChunker, TableChunker};
use rag_store::VectorStore;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

const PREVIEW_CHARS: usize = 80;

/// Outcome of one `process_file` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub source: String,
    pub index_name: String,
    pub pages: usize,
    pub tables: usize,
    pub text_chunks: usize,
    pub table_chunks: usize,
    pub stored: usize,
}

/// One line of `rag-ingest chunk` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkSummary<'a> {
    pub index: usize,
    pub chars: usize,
    pub metadata: &'a rag_chunker::Metadata,
    pub preview: String,
}

impl<'a> ChunkSummary<'a> {
    pub fn new(index: usize, chunk: &'a Chunk) -> Self {
        Self {
            index,
            chars: chunk.char_count(),
            metadata: &chunk.metadata,
            preview: chunk.content.chars().take(PREVIEW_CHARS).collect(),
        }
    }
}

/// Page text through the paragraph chunker, tables through the table
/// chunker. Pages keep document order; table chunks follow all text chunks.
pub fn chunk_document(
    document: &LoadedDocument,
    paragraph_chunker: &ParagraphChunker,
    table_chunker: &TableChunker,
) -> (Vec<Chunk>, Vec<Chunk>) {
    let text_chunks = document
        .pages
        .iter()
        .flat_map(|page| paragraph_chunker.chunk(&page.text, Some(&page.metadata)))
        .collect();

    let table_chunks = document
        .tables
        .iter()
        .flat_map(|source| {
            table_chunker.chunk_with_metadata(std::slice::from_ref(&source.table), &source.metadata)
        })
        .collect();

    (text_chunks, table_chunks)
}

pub struct DocumentProcessor {
    loader: DocumentLoader,
    paragraph_chunker: ParagraphChunker,
    table_chunker: TableChunker,
    store: Arc<dyn VectorStore>,
    upsert_batch_size: usize,
}

impl DocumentProcessor {
    pub fn new(settings: &Settings, store: Arc<dyn VectorStore>) -> Result<Self, WorkerError> {
        Ok(Self {
            loader: DocumentLoader::from_config(&settings.loader)?,
            paragraph_chunker: settings.chunking.paragraph_chunker()?,
            table_chunker: settings.chunking.table_chunker()?,
            store,
            upsert_batch_size: settings.ingest.upsert_batch_size.max(1),
        })
    }

    /// Load, chunk, embed and store one document into `index_name`.
    pub async fn process_file(
        &self,
        path: &Path,
        index_name: &str,
    ) -> Result<IngestReport, WorkerError> {
        info!("📄 Processing {:?} into '{}'", path, index_name);

        let document = self.loader.load(path)?;
        self.ingest_document(&document, index_name).await
    }

    /// Chunk an already loaded document and store it into `index_name`.
    ///
    /// The index is only created when there is at least one chunk to store.
    pub async fn ingest_document(
        &self,
        document: &LoadedDocument,
        index_name: &str,
    ) -> Result<IngestReport, WorkerError> {
        let mut report = IngestReport {
            source: document.source.clone(),
            index_name: index_name.to_string(),
            pages: document.pages.len(),
            tables: document.tables.len(),
            ..Default::default()
        };

        if document.is_empty() {
            warn!("{} has no extractable text", document.source);
            return Ok(report);
        }

        info!("✂️  Chunking text...");
        let (text_chunks, table_chunks) =
            chunk_document(document, &self.paragraph_chunker, &self.table_chunker);
        report.text_chunks = text_chunks.len();
        report.table_chunks = table_chunks.len();

        let chunks: Vec<Chunk> = text_chunks.into_iter().chain(table_chunks).collect();
        if chunks.is_empty() {
            warn!("{} produced no chunks", document.source);
            return Ok(report);
        }

        info!(
            "Created {} chunks ({} text, {} table)",
            chunks.len(),
            report.text_chunks,
            report.table_chunks
        );

        self.store.ensure_index(index_name).await?;

        info!("🧠 Embedding and storing chunks...");
        for (i, batch) in chunks.chunks(self.upsert_batch_size).enumerate() {
            let stored = self.store.upsert(index_name, batch).await?;
            debug!("Batch {}: stored {} chunks", i + 1, stored);
            report.stored += stored;
        }

        info!(
            "✅ Stored {} chunks from {} in '{}'",
            report.stored, document.source, index_name
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChunkingConfig, IngestConfig, LoaderConfig};
    use crate::document::{Page, TableSource};
    use async_trait::async_trait;
    use rag_chunker::{Metadata, TableBlock};
    use rag_store::{DatabaseConfig, IndexStats, ScoredChunk, StoreError};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Records upsert batches per index.
    #[derive(Default)]
    struct RecordingStore {
        indexes: Mutex<BTreeMap<String, Vec<Vec<Chunk>>>>,
    }

    #[async_trait]
    impl VectorStore for RecordingStore {
        async fn ensure_index(&self, index_name: &str) -> Result<(), StoreError> {
            self.indexes
                .lock()
                .unwrap()
                .entry(index_name.to_string())
                .or_default();
            Ok(())
        }

        async fn upsert(&self, index_name: &str, chunks: &[Chunk]) -> Result<usize, StoreError> {
            let mut indexes = self.indexes.lock().unwrap();
            let batches = indexes
                .get_mut(index_name)
                .ok_or_else(|| StoreError::IndexNotFound(index_name.to_string()))?;
            batches.push(chunks.to_vec());
            Ok(chunks.len())
        }

        async fn query(
            &self,
            _index_name: &str,
            _question: &str,
            _k: usize,
        ) -> Result<Vec<ScoredChunk>, StoreError> {
            Ok(Vec::new())
        }

        async fn describe_index(&self, index_name: &str) -> Result<IndexStats, StoreError> {
            Err(StoreError::IndexNotFound(index_name.to_string()))
        }

        async fn list_indexes(&self) -> Result<Vec<String>, StoreError> {
            Ok(self.indexes.lock().unwrap().keys().cloned().collect())
        }

        async fn delete_index(&self, index_name: &str) -> Result<bool, StoreError> {
            Ok(self.indexes.lock().unwrap().remove(index_name).is_some())
        }

        async fn delete_all_indexes(&self) -> Result<u64, StoreError> {
            let mut indexes = self.indexes.lock().unwrap();
            let count = indexes.len() as u64;
            indexes.clear();
            Ok(count)
        }
    }

    fn settings(upsert_batch_size: usize) -> Settings {
        Settings {
            database: DatabaseConfig {
                url: "postgres://localhost/rag".to_string(),
                pool_max_size: 1,
                pool_timeout_seconds: 1,
            },
            embedding: serde_json::from_str(r#"{"base_url": "http://localhost:8080"}"#).unwrap(),
            chunking: ChunkingConfig {
                min_chunk_size: 20,
                max_chunk_size: 60,
                table_max_rows: 2,
                table_overlap: 1,
            },
            loader: LoaderConfig::default(),
            ingest: IngestConfig {
                index_name: "diet-plan-chatbot".to_string(),
                upsert_batch_size,
            },
        }
    }

    fn metadata(value: serde_json::Value) -> Metadata {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_chunk_document_keeps_page_metadata() {
        let document = LoadedDocument {
            source: "plan.pdf".to_string(),
            pages: vec![
                Page {
                    text: "Breakfast is porridge.\n\nLunch is soup.".to_string(),
                    metadata: metadata(json!({"source": "plan.pdf", "page": 1})),
                },
                Page {
                    text: "Dinner is fish.".to_string(),
                    metadata: metadata(json!({"source": "plan.pdf", "page": 2})),
                },
            ],
            tables: vec![TableSource {
                table: TableBlock::new(
                    vec!["day".into(), "kcal".into()],
                    vec![
                        vec!["Mon".into(), "1800".into()],
                        vec!["Tue".into(), "1900".into()],
                        vec!["Wed".into(), "2000".into()],
                    ],
                ),
                metadata: metadata(json!({"source": "plan.pdf", "sheet": "Week"})),
            }],
        };

        let paragraph = ParagraphChunker::new(20, 60).unwrap();
        let table = TableChunker::new(2, 1).unwrap();
        let (text_chunks, table_chunks) = chunk_document(&document, &paragraph, &table);

        assert_eq!(text_chunks.len(), 2);
        assert_eq!(text_chunks[0].metadata["page"], 1);
        assert_eq!(text_chunks[1].metadata["page"], 2);
        assert_eq!(text_chunks[1].content, "Dinner is fish.");

        assert_eq!(table_chunks.len(), 3);
        assert!(table_chunks.iter().all(|c| c.content.starts_with("day,kcal\n")));
        assert!(table_chunks.iter().all(|c| c.metadata["sheet"] == "Week"));
    }

    #[tokio::test]
    async fn test_process_file_stores_in_batches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.txt");
        std::fs::write(
            &path,
            "Breakfast is porridge with berries.\n\n\
             Lunch is a bowl of vegetable soup.\n\n\
             Dinner is baked fish with salad.\n\n\
             Snacks are nuts and an apple.",
        )
        .unwrap();

        let store = Arc::new(RecordingStore::default());
        let processor = DocumentProcessor::new(&settings(1), store.clone()).unwrap();

        let report = processor
            .process_file(&path, "diet-plan-chatbot")
            .await
            .unwrap();

        assert_eq!(report.pages, 1);
        assert_eq!(report.table_chunks, 0);
        assert!(report.text_chunks > 1);
        assert_eq!(report.stored, report.text_chunks);

        let indexes = store.indexes.lock().unwrap();
        let batches = &indexes["diet-plan-chatbot"];
        assert_eq!(batches.len(), report.text_chunks);
        assert!(batches.iter().all(|batch| batch.len() == 1));
        assert_eq!(
            batches[0][0].content,
            "Breakfast is porridge with berries."
        );
    }

    #[tokio::test]
    async fn test_empty_document_skips_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "\n\n   \n").unwrap();

        let store = Arc::new(RecordingStore::default());
        let processor = DocumentProcessor::new(&settings(10), store.clone()).unwrap();

        let report = processor.process_file(&path, "diet-plan-chatbot").await.unwrap();

        assert_eq!(report.stored, 0);
        assert!(store.indexes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_header_only_tables_skip_store() {
        let document = LoadedDocument {
            source: "menu.xlsx".to_string(),
            pages: Vec::new(),
            tables: vec![TableSource {
                table: TableBlock::new(vec!["day".into(), "meal".into()], Vec::new()),
                metadata: metadata(json!({"source": "menu.xlsx", "sheet": "Week"})),
            }],
        };
        assert!(!document.is_empty());

        let store = Arc::new(RecordingStore::default());
        let processor = DocumentProcessor::new(&settings(10), store.clone()).unwrap();

        let report = processor
            .ingest_document(&document, "diet-plan-chatbot")
            .await
            .unwrap();

        assert_eq!(report.tables, 1);
        assert_eq!(report.table_chunks, 0);
        assert_eq!(report.stored, 0);
        assert!(store.indexes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_fails_before_store() {
        let store = Arc::new(RecordingStore::default());
        let processor = DocumentProcessor::new(&settings(10), store.clone()).unwrap();

        let err = processor
            .process_file(Path::new("/nonexistent/plan.pdf"), "diet-plan-chatbot")
            .await
            .unwrap_err();

        assert!(matches!(err, WorkerError::FileNotFound(_)));
        assert!(store.indexes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_chunk_summary_preview() {
        let chunk = Chunk::new("x".repeat(200), Metadata::new());
        let summary = ChunkSummary::new(3, &chunk);

        assert_eq!(summary.index, 3);
        assert_eq!(summary.chars, 200);
        assert_eq!(summary.preview.chars().count(), PREVIEW_CHARS);
    }
}
