use once_cell::sync::Lazy;
use rag_store::ScoredChunk;
use regex::{Captures, Regex};
use thiserror::Error;
use tracing::debug;

const CONTEXT: &str = "context";
const QUESTION: &str = "question";
const LANGUAGE: &str = "language";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(context|question|language)\}").expect("valid placeholder regex"));

pub const DEFAULT_TEMPLATE: &str = "\
You are an expert dietitian capable of creating personalized diet plans according to client needs.
Carefully analyze the provided information and restrictions.

Instructions:
1. Always respond in {language}.
2. Provide detailed and specific dietary advice based on the given context and question.
3. Consider any mentioned health conditions, allergies, or dietary restrictions.
4. If the question is unclear or lacks necessary information, ask for clarification.
5. Include balanced meal suggestions and portion recommendations when appropriate.
6. Offer alternatives for common food intolerances or allergies.
7. If the question is outside your expertise or not related to diet, politely redirect the conversation back to dietary topics.

Context: {context}

Question: {question}

Answer (in {language}):";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PromptError {
    #[error("Prompt template is missing the {{{0}}} placeholder")]
    MissingPlaceholder(&'static str),
}

/// Instruction template with `{context}`, `{question}` and `{language}`
/// placeholders, all required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, PromptError> {
        let template = template.into();

        for name in [CONTEXT, QUESTION, LANGUAGE] {
            if !template.contains(&format!("{{{}}}", name)) {
                return Err(PromptError::MissingPlaceholder(name));
            }
        }

        Ok(Self { template })
    }

    /// Substitutes in a single pass, so placeholder-like text inside the
    /// context or question is left untouched.
    pub fn render(&self, context: &str, question: &str, language: &str) -> String {
        PLACEHOLDER
            .replace_all(&self.template, |caps: &Captures| match &caps[1] {
                CONTEXT => context.to_string(),
                QUESTION => question.to_string(),
                _ => language.to_string(),
            })
            .into_owned()
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// "Stuff" the retrieved chunks into one context string, most similar first.
///
/// Chunks are added whole while the total stays within `max_length`
/// characters. A first chunk longer than the limit is cut to it.
pub fn build_context(chunks: &[ScoredChunk], max_length: usize) -> String {
    let mut context = String::new();
    let mut length = 0;

    for (i, scored) in chunks.iter().enumerate() {
        let content = scored.chunk.content.as_str();
        let separator = if context.is_empty() { 0 } else { 2 };
        let size = content.chars().count();

        if length + separator + size > max_length {
            if context.is_empty() {
                context = content.chars().take(max_length).collect();
            }
            debug!(
                "Context truncated at {} of {} chunks (max length: {})",
                i.max(1),
                chunks.len(),
                max_length
            );
            break;
        }

        if separator > 0 {
            context.push_str("\n\n");
        }
        context.push_str(content);
        length += separator + size;
    }

    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_chunker::{Chunk, Metadata};

    fn scored(content: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk::new(content, Metadata::new()),
            similarity: 0.9,
        }
    }

    #[test]
    fn test_default_template_renders_all_placeholders() {
        let prompt = PromptTemplate::default().render("Oats 200 g", "Ką valgyti?", "Lithuanian");

        assert!(prompt.contains("Always respond in Lithuanian."));
        assert!(prompt.contains("Context: Oats 200 g"));
        assert!(prompt.contains("Question: Ką valgyti?"));
        assert!(prompt.ends_with("Answer (in Lithuanian):"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_render_is_single_pass() {
        let template = PromptTemplate::new("C={context} Q={question} L={language}").unwrap();
        let prompt = template.render("{question}", "why?", "English");

        assert_eq!(prompt, "C={question} Q=why? L=English");
    }

    #[test]
    fn test_template_requires_all_placeholders() {
        assert_eq!(
            PromptTemplate::new("Q: {question} ({language})"),
            Err(PromptError::MissingPlaceholder("context"))
        );
        assert_eq!(
            PromptTemplate::new("C: {context} ({language})"),
            Err(PromptError::MissingPlaceholder("question"))
        );
        assert_eq!(
            PromptTemplate::new("C: {context} Q: {question}"),
            Err(PromptError::MissingPlaceholder("language"))
        );
        assert!(PromptTemplate::new("{context}{question}{language}").is_ok());
    }

    #[test]
    fn test_build_context_joins_with_blank_lines() {
        let chunks = vec![scored("first"), scored("second")];
        assert_eq!(build_context(&chunks, 100), "first\n\nsecond");
    }

    #[test]
    fn test_build_context_stops_on_chunk_boundary() {
        let chunks = vec![scored("aaaa"), scored("bbbb"), scored("cccc")];

        // 4 + 2 + 4 = 10 fits, the third chunk would need 16
        assert_eq!(build_context(&chunks, 12), "aaaa\n\nbbbb");
        assert_eq!(build_context(&chunks, 10), "aaaa\n\nbbbb");
        assert_eq!(build_context(&chunks, 9), "aaaa");
    }

    #[test]
    fn test_build_context_cuts_oversized_first_chunk() {
        let chunks = vec![scored("ąčęėįšųūž"), scored("next")];
        assert_eq!(build_context(&chunks, 4), "ąčęė");
    }

    #[test]
    fn test_build_context_empty() {
        assert_eq!(build_context(&[], 100), "");
    }
}
