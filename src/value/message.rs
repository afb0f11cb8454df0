use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// A single mention delivered by the chat platform, reduced to the fields the
/// answering pipeline needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    pub raw_text: String,

    /// Channel (or DM) the mention was posted in.
    pub conversation_id: String,

    /// Thread the reply is posted under. The thread id when the mention was
    /// made inside a thread, otherwise the mention's own timestamp.
    pub reply_target: String,
}

impl IncomingMessage {
    pub fn new(
        raw_text: impl Into<String>,
        conversation_id: impl Into<String>,
        reply_target: impl Into<String>,
    ) -> Self {
        Self {
            raw_text: raw_text.into(),
            conversation_id: conversation_id.into(),
            reply_target: reply_target.into(),
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueryKind {
    Question,
    CodeSnippet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub kind: QueryKind,
    pub content: String,
}

impl Query {
    pub fn new(kind: QueryKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
