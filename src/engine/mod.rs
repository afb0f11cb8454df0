pub(crate) mod code_explainer;
pub(crate) mod doc_answerer;

pub use code_explainer::CodeExplainer;
pub use doc_answerer::{DocAnswerer, join_context};

use crate::prompt::PromptError;

/// Faults an answering handler can report. The router turns every variant
/// into a fixed apology; the wrapped detail only ever reaches the log.
#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("retrieval failed: {0:#}")]
    Retrieval(anyhow::Error),

    #[error("generation failed: {0:#}")]
    Generation(anyhow::Error),

    #[error("unexpected fault: {0:#}")]
    Unknown(anyhow::Error),
}

impl AnswerError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnswerError::Retrieval(_) => "retrieval",
            AnswerError::Generation(_) => "generation",
            AnswerError::Unknown(_) => "unknown",
        }
    }
}

impl From<PromptError> for AnswerError {
    fn from(value: PromptError) -> Self {
        AnswerError::Unknown(value.into())
    }
}
