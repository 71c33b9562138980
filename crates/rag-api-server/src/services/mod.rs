pub mod llm_service;
pub mod prompt;
pub mod rag_service;

pub use llm_service::{ChatMessage, LlmProvider, LlmService};
pub use prompt::PromptTemplate;
pub use rag_service::{Answer, RagService};
