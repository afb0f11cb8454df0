use std::{fmt::Debug, sync::Arc};

use crate::{model::LangModelInferConfig, utils::BoxFuture, value::Embedding};

pub type CustomLangModelInferFunc = dyn Fn(String, LangModelInferConfig) -> BoxFuture<'static, anyhow::Result<String>>
    + Send
    + Sync;

pub type CustomEmbeddingModelInferFunc =
    dyn Fn(String) -> BoxFuture<'static, anyhow::Result<Embedding>> + Send + Sync;

#[derive(Clone)]
pub(super) struct CustomLangModel {
    pub infer_func: Arc<CustomLangModelInferFunc>,
}

impl CustomLangModel {
    pub async fn infer(
        &self,
        prompt: String,
        config: LangModelInferConfig,
    ) -> anyhow::Result<String> {
        (self.infer_func)(prompt, config).await
    }
}

impl Debug for CustomLangModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomLangModel")
            .field("infer_func", &"function")
            .finish()
    }
}

#[derive(Clone)]
pub(super) struct CustomEmbeddingModel {
    pub infer_func: Arc<CustomEmbeddingModelInferFunc>,
}

impl CustomEmbeddingModel {
    pub async fn infer(&self, text: String) -> anyhow::Result<Embedding> {
        (self.infer_func)(text).await
    }
}

impl Debug for CustomEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomEmbeddingModel")
            .field("infer_func", &"function")
            .finish()
    }
}
