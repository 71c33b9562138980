use crate::error::StoreError;
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// One vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError>;

    async fn embed_single(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Embedding("No embedding returned".to_string()))
    }

    /// Length of every vector this provider returns.
    fn dimension(&self) -> usize;
}
