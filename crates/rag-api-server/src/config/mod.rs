pub mod settings;

pub use settings::{LlmConfig, PromptsConfig, RagConfig, ServerConfig, Settings};
