use super::encoding::decode_text;
use super::{pdf, spreadsheet};
use crate::config::LoaderConfig;
use crate::utils::error::WorkerError;
use encoding_rs::Encoding;
use rag_chunker::{Metadata, TableBlock};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Extracted text of one page with `{source, page}` metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub text: String,
    pub metadata: Metadata,
}

/// A worksheet table with `{source, sheet}` metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSource {
    pub table: TableBlock,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedDocument {
    pub source: String,
    pub pages: Vec<Page>,
    pub tables: Vec<TableSource>,
}

impl LoadedDocument {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.tables.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
    Spreadsheet,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("pdf") => Some(Self::Pdf),
            Some("txt") | Some("md") | Some("text") => Some(Self::Text),
            Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

pub struct DocumentLoader {
    native: &'static Encoding,
    max_file_size_mb: u64,
}

impl DocumentLoader {
    pub fn new(native: &'static Encoding, max_file_size_mb: u64) -> Self {
        Self {
            native,
            max_file_size_mb,
        }
    }

    pub fn from_config(config: &LoaderConfig) -> Result<Self, WorkerError> {
        Ok(Self::new(config.encoding()?, config.max_file_size_mb))
    }

    /// Validate file before processing
    pub fn validate_file(&self, path: &Path) -> Result<DocumentKind, WorkerError> {
        if !path.exists() {
            return Err(WorkerError::FileNotFound(path.display().to_string()));
        }

        if !path.is_file() {
            return Err(WorkerError::NotAFile(path.display().to_string()));
        }

        let kind = DocumentKind::from_path(path)
            .ok_or_else(|| WorkerError::UnsupportedFileType(path.display().to_string()))?;

        let size_mb = fs::metadata(path)?.len() / 1024 / 1024;
        if size_mb > self.max_file_size_mb {
            return Err(WorkerError::FileTooLarge(size_mb, self.max_file_size_mb));
        }

        Ok(kind)
    }

    pub fn load(&self, path: &Path) -> Result<LoadedDocument, WorkerError> {
        let kind = self.validate_file(path)?;
        let source = path.display().to_string();

        debug!("Loading {:?} as {:?}", path, kind);

        let document = match kind {
            DocumentKind::Pdf => {
                let pages = pdf::extract_pages(path, self.native)?
                    .into_iter()
                    .filter_map(|(number, text)| page(&source, number, text))
                    .collect();
                LoadedDocument {
                    source,
                    pages,
                    tables: Vec::new(),
                }
            }
            DocumentKind::Text => {
                let (text, encoding) = decode_text(&fs::read(path)?, self.native);
                debug!("Decoded {:?} as {}", path, encoding.name());
                LoadedDocument {
                    pages: page(&source, 1, text).into_iter().collect(),
                    source,
                    tables: Vec::new(),
                }
            }
            DocumentKind::Spreadsheet => {
                let tables = spreadsheet::load_workbook(path)?
                    .into_iter()
                    .map(|(sheet, table)| TableSource {
                        table,
                        metadata: sheet_metadata(&source, &sheet),
                    })
                    .collect();
                LoadedDocument {
                    source,
                    pages: Vec::new(),
                    tables,
                }
            }
        };

        info!(
            "📖 Loaded {:?}: {} pages, {} tables",
            path,
            document.pages.len(),
            document.tables.len()
        );

        Ok(document)
    }
}

/// Whitespace-only pages are dropped.
fn page(source: &str, number: u32, text: String) -> Option<Page> {
    if text.trim().is_empty() {
        return None;
    }

    let mut metadata = Metadata::new();
    metadata.insert("source".to_string(), Value::from(source));
    metadata.insert("page".to_string(), Value::from(number));

    Some(Page { text, metadata })
}

fn sheet_metadata(source: &str, sheet: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("source".to_string(), Value::from(source));
    metadata.insert("sheet".to_string(), Value::from(sheet));
    metadata
}
