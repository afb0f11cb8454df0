use std::sync::Arc;

use crate::{
    engine::AnswerError,
    model::{LangModel, LangModelInferConfig, LangModelInference as _},
    prompt::{Bindings, PromptLibrary, TemplateId},
    value::Answer,
};

/// Explains a pasted snippet in one generation call. Never touches the index.
#[derive(Clone, Debug)]
pub struct CodeExplainer {
    lm: LangModel,
    prompts: Arc<PromptLibrary>,
    config: LangModelInferConfig,
}

impl CodeExplainer {
    pub fn new(lm: LangModel, prompts: Arc<PromptLibrary>, config: LangModelInferConfig) -> Self {
        Self {
            lm,
            prompts,
            config,
        }
    }

    pub async fn explain(&self, snippet: &str) -> Result<Answer, AnswerError> {
        let bindings = Bindings::from([("code_snippet".to_owned(), snippet.to_owned())]);
        let prompt = self.prompts.render(TemplateId::CodeExplain, &bindings)?;
        let text = self
            .lm
            .infer(prompt.filled_text, self.config.clone())
            .await
            .map_err(AnswerError::Generation)?;
        Ok(Answer::generated(text))
    }
}
