use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form chunk metadata, e.g. `{"source": "plan.pdf", "page": 3}`.
pub type Metadata = Map<String, Value>;

/// A unit of chunker output.
///
/// Every chunk owns its metadata; chunks produced by the same call carry equal
/// but independent copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Chunk {
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Length in characters, the unit all chunk sizes are measured in.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}
