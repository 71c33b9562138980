use crate::services::prompt::PromptTemplate;
use anyhow::Result;
use config::{Config, Environment, File};
use rag_store::{validate_index_name, DatabaseConfig, EmbeddingConfig};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_FILE: &str = "config/server";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub rag: RagConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit_kb")]
    pub body_limit_kb: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RagConfig {
    #[serde(default = "default_index_name")]
    pub index_name: String,
    #[serde(default = "default_top_k")]
    pub retrieval_top_k: usize,
    /// Characters of retrieved text placed into the prompt.
    #[serde(default = "default_max_context_length")]
    pub max_context_length: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptsConfig {
    /// Overrides the built-in template; must contain `{context}`, `{question}`
    /// and `{language}`.
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default = "default_output_language")]
    pub output_language: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit_kb() -> usize {
    64
}

fn default_llm_model() -> String {
    "gpt-4o".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_max_tokens() -> usize {
    1024
}

fn default_index_name() -> String {
    "diet-plan-chatbot".to_string()
}

fn default_top_k() -> usize {
    4
}

fn default_max_context_length() -> usize {
    8000
}

fn default_output_language() -> String {
    "Lithuanian".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_kb: default_body_limit_kb(),
        }
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            index_name: default_index_name(),
            retrieval_top_k: default_top_k(),
            max_context_length: default_max_context_length(),
        }
    }
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            template: None,
            output_language: default_output_language(),
        }
    }
}

impl PromptsConfig {
    pub fn prompt_template(&self) -> Result<PromptTemplate> {
        let template = match &self.template {
            Some(template) => PromptTemplate::new(template.clone())?,
            None => PromptTemplate::default(),
        };

        Ok(template)
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Optional config file, then `APP__SECTION__KEY` environment overrides.
    pub fn load_from(file: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        validate_index_name(&self.rag.index_name)?;
        self.prompts.prompt_template()?;

        if self.rag.retrieval_top_k == 0 {
            anyhow::bail!("rag.retrieval_top_k must be greater than 0");
        }

        if self.rag.max_context_length == 0 {
            anyhow::bail!("rag.max_context_length must be greater than 0");
        }

        if self.prompts.output_language.trim().is_empty() {
            anyhow::bail!("prompts.output_language must not be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        serde_json::from_value(serde_json::json!({
            "database": {"url": "postgres://localhost/rag"},
            "embedding": {"base_url": "https://api.openai.com"},
            "llm": {"base_url": "https://api.openai.com"}
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = settings();

        assert!(settings.validate().is_ok());
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.llm.model, "gpt-4o");
        assert_eq!(settings.rag.retrieval_top_k, 4);
        assert_eq!(settings.rag.index_name, "diet-plan-chatbot");
        assert_eq!(settings.prompts.output_language, "Lithuanian");
        assert!(settings.prompts.template.is_none());
    }

    #[test]
    fn test_missing_prompts_section_uses_defaults() {
        let settings = settings();
        let defaults = PromptsConfig::default();

        assert_eq!(defaults.output_language, "Lithuanian");
        assert_eq!(settings.prompts.output_language, defaults.output_language);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_template_without_language_rejected() {
        let mut settings = settings();
        settings.prompts.template = Some("{context}\n\n{question}".to_string());

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_template_without_placeholders_rejected() {
        let mut settings = settings();
        settings.prompts.template = Some("Answer: {question}".to_string());

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut settings = settings();
        settings.rag.retrieval_top_k = 0;

        assert!(settings.validate().is_err());
    }
}
