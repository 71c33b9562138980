pub mod settings;

pub use settings::{ChunkSettings, ChunkingConfig, IngestConfig, LoaderConfig, Settings};
