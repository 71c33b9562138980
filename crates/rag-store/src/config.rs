use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
    #[serde(default = "default_pool_timeout")]
    pub pool_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dimension")]
    pub dimension: usize, // 1536 untuk text-embedding-ada-002
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_pool_max_size() -> u32 {
    5
}

fn default_pool_timeout() -> u64 {
    30
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_dimension() -> usize {
    1536
}

fn default_batch_size() -> usize {
    64
}

fn default_timeout() -> u64 {
    60
}
