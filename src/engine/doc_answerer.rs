use std::sync::Arc;

use crate::{
    engine::AnswerError,
    knowledge::{Knowledge, KnowledgeBehavior as _},
    model::{LangModel, LangModelInferConfig, LangModelInference as _},
    prompt::{Bindings, PromptLibrary, TemplateId},
    value::{Answer, RetrievedChunk},
};

/// Chunk texts in retrieval order, separated by a blank line. Duplicates are kept.
pub fn join_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Answers documentation questions from the knowledge index.
#[derive(Clone, Debug)]
pub struct DocAnswerer {
    knowledge: Knowledge,
    lm: LangModel,
    prompts: Arc<PromptLibrary>,
    top_k: usize,
    config: LangModelInferConfig,
}

impl DocAnswerer {
    pub fn new(
        knowledge: Knowledge,
        lm: LangModel,
        prompts: Arc<PromptLibrary>,
        top_k: usize,
        config: LangModelInferConfig,
    ) -> Self {
        Self {
            knowledge,
            lm,
            prompts,
            top_k,
            config,
        }
    }

    pub async fn answer(&self, question: &str) -> Result<Answer, AnswerError> {
        let chunks = self
            .knowledge
            .retrieve(question.to_owned(), self.top_k)
            .await
            .map_err(AnswerError::Retrieval)?;
        log::debug!(
            "Answering from {} chunks: {:?}",
            chunks.len(),
            chunks.iter().map(|c| &c.source_ref).collect::<Vec<_>>()
        );

        let bindings = Bindings::from([
            ("context".to_owned(), join_context(&chunks)),
            ("input".to_owned(), question.to_owned()),
        ]);
        let prompt = self.prompts.render(TemplateId::DocAnswer, &bindings)?;

        let text = self
            .lm
            .infer(prompt.filled_text, self.config.clone())
            .await
            .map_err(AnswerError::Generation)?;
        Ok(Answer::generated(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        utils::test::{failing_knowledge, recording_knowledge, recording_lm},
        value::AnswerOrigin,
    };

    fn chunks() -> Vec<RetrievedChunk> {
        vec![
            RetrievedChunk::new("Passwords are reset from the admin console.", "docs/auth.md"),
            RetrievedChunk::new("Users get a reset link by email.", "docs/auth.md"),
            RetrievedChunk::new("Passwords are reset from the admin console.", "docs/faq.md"),
        ]
    }

    #[test]
    fn context_keeps_order_and_duplicates() {
        assert_eq!(
            join_context(&chunks()),
            "Passwords are reset from the admin console.\n\n\
             Users get a reset link by email.\n\n\
             Passwords are reset from the admin console."
        );
        assert_eq!(join_context(&[]), "");
    }

    #[tokio::test]
    async fn prompt_contains_every_chunk_in_order_and_the_question() {
        let (knowledge, retrievals) = recording_knowledge(chunks());
        let (lm, prompts) = recording_lm(|_| Ok("Use the admin console.".to_owned()));
        let answerer = DocAnswerer::new(
            knowledge,
            lm,
            Arc::new(PromptLibrary::new().unwrap()),
            3,
            LangModelInferConfig::with_temperature(0.3),
        );

        let answer = answerer.answer("How do I reset a password?").await.unwrap();
        assert_eq!(answer.text, "Use the admin console.");
        assert_eq!(answer.origin, AnswerOrigin::Generated);

        assert_eq!(
            retrievals.snapshot(),
            vec![("How do I reset a password?".to_owned(), 3)]
        );
        let calls = prompts.snapshot();
        assert_eq!(calls.len(), 1);
        let (prompt, config) = &calls[0];
        assert!(prompt.contains(&join_context(&chunks())));
        assert!(prompt.contains("Question:\nHow do I reset a password?"));
        assert_eq!(config.temperature, Some(0.3));
    }

    #[tokio::test]
    async fn empty_retrieval_still_generates() {
        let (knowledge, _) = recording_knowledge(vec![]);
        let (lm, prompts) = recording_lm(|_| {
            Ok("I couldn't find the information in the available documents.".to_owned())
        });
        let answerer = DocAnswerer::new(
            knowledge,
            lm,
            Arc::new(PromptLibrary::new().unwrap()),
            4,
            LangModelInferConfig::default(),
        );
        let answer = answerer.answer("What is the VPN address?").await.unwrap();
        assert_eq!(answer.origin, AnswerOrigin::Generated);
        assert_eq!(prompts.len(), 1);
    }

    #[tokio::test]
    async fn search_failure_is_a_retrieval_error_and_skips_generation() {
        let (lm, prompts) = recording_lm(|_| Ok("unused".to_owned()));
        let answerer = DocAnswerer::new(
            failing_knowledge("index unavailable"),
            lm,
            Arc::new(PromptLibrary::new().unwrap()),
            4,
            LangModelInferConfig::default(),
        );
        let err = answerer.answer("anything").await.unwrap_err();
        assert!(matches!(err, AnswerError::Retrieval(_)));
        assert_eq!(prompts.len(), 0);
    }

    #[tokio::test]
    async fn model_failure_is_a_generation_error() {
        let (knowledge, _) = recording_knowledge(chunks());
        let (lm, _) = recording_lm(|_| Err(anyhow::anyhow!("deadline exceeded")));
        let answerer = DocAnswerer::new(
            knowledge,
            lm,
            Arc::new(PromptLibrary::new().unwrap()),
            4,
            LangModelInferConfig::default(),
        );
        let err = answerer.answer("anything").await.unwrap_err();
        assert!(matches!(err, AnswerError::Generation(_)));
        assert_eq!(err.kind(), "generation");
    }
}
