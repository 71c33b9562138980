pub mod encoding;
pub mod loader;
pub mod pdf;
pub mod spreadsheet;

pub use loader::{DocumentKind, DocumentLoader, LoadedDocument, Page, TableSource};
