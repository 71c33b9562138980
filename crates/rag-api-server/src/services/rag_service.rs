use crate::config::RagConfig;
use crate::services::llm_service::{ChatMessage, LlmProvider};
use crate::services::prompt::{build_context, PromptTemplate};
use crate::utils::error::ApiError;
use rag_store::{ScoredChunk, VectorStore};
use std::sync::Arc;
use tracing::{debug, info};

const LOG_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<ScoredChunk>,
}

/// Retrieval-augmented answering over one index.
pub struct RagService {
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmProvider>,
    prompt: PromptTemplate,
    output_language: String,
    config: RagConfig,
}

impl RagService {
    pub fn new(
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmProvider>,
        prompt: PromptTemplate,
        output_language: impl Into<String>,
        config: RagConfig,
    ) -> Self {
        Self {
            store,
            llm,
            prompt,
            output_language: output_language.into(),
            config,
        }
    }

    /// Top `retrieval_top_k` chunks for `question`, most similar first.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>, ApiError> {
        let chunks = self
            .store
            .query(&self.config.index_name, question, self.config.retrieval_top_k)
            .await?;

        debug!("Retrieved {} chunks from '{}'", chunks.len(), self.config.index_name);
        for (i, scored) in chunks.iter().enumerate() {
            let preview: String = scored
                .chunk
                .content
                .chars()
                .take(LOG_PREVIEW_CHARS)
                .collect();
            debug!(
                "Chunk {} (similarity {:.3}): {}... metadata={}",
                i + 1,
                scored.similarity,
                preview,
                serde_json::Value::Object(scored.chunk.metadata.clone())
            );
        }

        Ok(chunks)
    }

    /// Stuff `chunks` into the prompt and ask the model.
    pub async fn answer(&self, question: &str, chunks: &[ScoredChunk]) -> Result<String, ApiError> {
        let context = build_context(chunks, self.config.max_context_length);
        let prompt = self.prompt.render(&context, question, &self.output_language);

        self.llm.generate(&[ChatMessage::user(prompt)]).await
    }

    pub async fn ask(&self, question: &str) -> Result<Answer, ApiError> {
        info!("Answering question ({} chars)", question.chars().count());

        let sources = self.retrieve(question).await?;
        let text = self.answer(question, &sources).await?;

        Ok(Answer { text, sources })
    }
}
