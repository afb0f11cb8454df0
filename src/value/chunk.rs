use serde::{Deserialize, Serialize};

/// A piece of documentation returned by the knowledge index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedChunk {
    pub text: String,

    /// Where the chunk came from, usually the path of the source document.
    pub source_ref: String,

    /// Similarity to the query, higher is closer. Only used for diagnostics.
    #[serde(default)]
    pub score: f64,
}

impl RetrievedChunk {
    pub fn new(text: impl Into<String>, source_ref: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_ref: source_ref.into(),
            score: 0.0,
        }
    }

    pub fn with_score(self, score: f64) -> Self {
        Self { score, ..self }
    }
}
