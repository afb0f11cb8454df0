use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{
    api::{APIModel, APISpecification},
    custom::{CustomLangModel, CustomLangModelInferFunc},
};

/// Sampling parameters for one generation call.
///
/// ## `temperature`
/// Lower values make output more deterministic. The documentation answerer
/// and the code explainer each carry their own value.
///
/// ## `top_p`
/// Nucleus sampling cutoff. Left to the provider's default when `None`.
///
/// ## `max_tokens`
/// Upper bound on generated tokens. Left to the provider's default when `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LangModelInferConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i32>,
}

impl LangModelInferConfig {
    pub fn with_temperature(temperature: f64) -> Self {
        Self {
            temperature: Some(temperature),
            ..Default::default()
        }
    }
}

/// The generative-text capability: one prompt in, one complete text out.
///
/// Implementations make exactly one request per call. There is no streaming,
/// retry or caching at this layer; a failure is returned to the caller as is.
#[async_trait]
pub trait LangModelInference: Send + Sync {
    async fn infer(&self, prompt: String, config: LangModelInferConfig) -> anyhow::Result<String>;
}

#[derive(Clone, Debug)]
enum LangModelInner {
    API(APIModel),
    Custom(CustomLangModel),
}

#[derive(Clone, Debug)]
pub struct LangModel {
    inner: LangModelInner,
}

impl LangModel {
    pub fn new_api(
        spec: APISpecification,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self::from_api_model(APIModel::new(spec, model, api_key))
    }

    pub fn from_api_model(model: APIModel) -> Self {
        Self {
            inner: LangModelInner::API(model),
        }
    }

    pub fn new_custom(f: Arc<CustomLangModelInferFunc>) -> Self {
        Self {
            inner: LangModelInner::Custom(CustomLangModel { infer_func: f }),
        }
    }
}

#[async_trait]
impl LangModelInference for LangModel {
    async fn infer(&self, prompt: String, config: LangModelInferConfig) -> anyhow::Result<String> {
        match &self.inner {
            LangModelInner::API(model) => model.generate(prompt, config).await,
            LangModelInner::Custom(model) => model.infer(prompt, config).await,
        }
    }
}
