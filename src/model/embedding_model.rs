use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    model::{
        api::{APIModel, APISpecification},
        custom::{CustomEmbeddingModel, CustomEmbeddingModelInferFunc},
    },
    value::Embedding,
};

#[async_trait]
pub trait EmbeddingModelInference: Send + Sync {
    async fn infer(&self, text: String) -> anyhow::Result<Embedding>;
}

#[derive(Debug, Clone)]
enum EmbeddingModelInner {
    API(APIModel),
    Custom(CustomEmbeddingModel),
}

#[derive(Debug, Clone)]
pub struct EmbeddingModel {
    inner: EmbeddingModelInner,
}

impl EmbeddingModel {
    pub fn new_api(
        spec: APISpecification,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self::from_api_model(APIModel::new(spec, model, api_key))
    }

    pub fn from_api_model(model: APIModel) -> Self {
        Self {
            inner: EmbeddingModelInner::API(model),
        }
    }

    pub fn new_custom(f: Arc<CustomEmbeddingModelInferFunc>) -> Self {
        Self {
            inner: EmbeddingModelInner::Custom(CustomEmbeddingModel { infer_func: f }),
        }
    }

    /// Model identifier the embeddings are produced with. Custom models have none.
    pub fn model_name(&self) -> Option<&str> {
        match &self.inner {
            EmbeddingModelInner::API(model) => Some(model.model()),
            EmbeddingModelInner::Custom(_) => None,
        }
    }
}

#[async_trait]
impl EmbeddingModelInference for EmbeddingModel {
    async fn infer(&self, text: String) -> anyhow::Result<Embedding> {
        match &self.inner {
            EmbeddingModelInner::API(model) => model.embed(text).await,
            EmbeddingModelInner::Custom(model) => model.infer(text).await,
        }
    }
}
