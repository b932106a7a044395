use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A unit of retrieved or loaded text with free-form metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Replace an empty result with a single placeholder document carrying `message`.
pub fn with_fallback(docs: Vec<Document>, message: &str) -> Vec<Document> {
    if docs.is_empty() {
        vec![Document::new(message)]
    } else {
        docs
    }
}
