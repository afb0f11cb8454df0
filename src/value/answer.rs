use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AnswerOrigin {
    #[default]
    Generated,

    /// The model said the documents do not cover the question. The prompt asks
    /// for this wording but nothing checks it, so the engine never reports
    /// this origin itself.
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub origin: AnswerOrigin,
}

impl Answer {
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: AnswerOrigin::Generated,
        }
    }
}
