use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;
use crate::error::StoreError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Client for OpenAI-compatible `/v1/embeddings` endpoints.
#[derive(Clone)]
pub struct HttpEmbeddingClient {
    client: Client,
    config: EmbeddingConfig,
}

impl HttpEmbeddingClient {
    pub fn new(config: EmbeddingConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
        let url = format!("{}/v1/embeddings", self.config.base_url.trim_end_matches('/'));
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Embedding(format!(
                "Embedding API error ({}): {}",
                status, body
            )));
        }

        let json: Value = response.json().await?;
        let embeddings = parse_embeddings(&json)?;

        if embeddings.len() != texts.len() {
            return Err(StoreError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        for embedding in &embeddings {
            if embedding.len() != self.config.dimension {
                return Err(StoreError::DimensionMismatch {
                    expected: self.config.dimension,
                    actual: embedding.len(),
                });
            }
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        let batch_size = self.config.batch_size.max(1);

        for (i, batch) in texts.chunks(batch_size).enumerate() {
            debug!(
                "Embedding batch {} ({} texts, model {})",
                i + 1,
                batch.len(),
                self.config.model
            );
            embeddings.extend(self.embed_batch(batch).await?);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

/// Accepts the OpenAI shape `{"data": [{"index", "embedding"}]}`, a bare
/// array of `{"embedding"}` objects, or llama.cpp's single `{"embedding"}`.
fn parse_embeddings(json: &Value) -> Result<Vec<Vec<f32>>, StoreError> {
    if let Some(data) = json.get("data").and_then(Value::as_array) {
        let mut indexed = data
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let index = item
                    .get("index")
                    .and_then(Value::as_u64)
                    .map(|i| i as usize)
                    .unwrap_or(position);
                to_vector(&item["embedding"]).map(|vector| (index, vector))
            })
            .collect::<Result<Vec<_>, _>>()?;

        indexed.sort_by_key(|(index, _)| *index);
        return Ok(indexed.into_iter().map(|(_, vector)| vector).collect());
    }

    if let Some(items) = json.as_array() {
        return items
            .iter()
            .map(|item| to_vector(&item["embedding"]))
            .collect();
    }

    if json.get("embedding").is_some() {
        return Ok(vec![to_vector(&json["embedding"])?]);
    }

    Err(StoreError::Embedding(format!(
        "Unrecognized embedding response format: {}",
        json
    )))
}

fn to_vector(value: &Value) -> Result<Vec<f32>, StoreError> {
    let values = value
        .as_array()
        .ok_or_else(|| StoreError::Embedding("Missing 'embedding' array".to_string()))?;

    // llama-server may nest a single vector: [[...]]
    let values = match values.first().and_then(Value::as_array) {
        Some(inner) => inner,
        None => values,
    };

    let vector: Vec<f32> = values
        .iter()
        .filter_map(|v| v.as_f64().map(|f| f as f32))
        .collect();

    if vector.is_empty() {
        return Err(StoreError::Embedding("Embedding vector is empty".to_string()));
    }

    Ok(vector)
}
