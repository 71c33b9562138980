pub mod http_client;
pub mod provider;

pub use http_client::HttpEmbeddingClient;
pub use provider::EmbeddingProvider;
