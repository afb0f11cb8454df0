pub(crate) mod chat_completion;
pub(crate) mod gemini;

use std::time::Duration;

use anyhow::{Context as _, bail};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use url::Url;

use crate::{constants::DEFAULT_REQUEST_TIMEOUT, model::LangModelInferConfig, value::Embedding};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum APISpecification {
    Gemini,
    ChatCompletion,
}

impl APISpecification {
    pub fn default_url(&self) -> &'static str {
        match self {
            APISpecification::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            APISpecification::ChatCompletion => "https://api.openai.com/v1",
        }
    }

    /// Environment variable the credential for this API is read from.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            APISpecification::Gemini => "GOOGLE_API_KEY",
            APISpecification::ChatCompletion => "OPENAI_API_KEY",
        }
    }
}

/// A hosted model reachable over HTTP: which wire format to speak, where, and
/// with which credential.
#[derive(Clone)]
pub struct APIModel {
    spec: APISpecification,
    model: String,
    api_key: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for APIModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("APIModel")
            .field("spec", &self.spec)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl APIModel {
    pub fn new(
        spec: APISpecification,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            spec,
            model: model.into(),
            api_key: api_key.into(),
            base_url: spec.default_url().to_owned(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Points the model at a different endpoint, e.g. a proxy or a
    /// self-hosted OpenAI-compatible server.
    pub fn with_base_url(self, base_url: impl AsRef<str>) -> anyhow::Result<Self> {
        let parsed = Url::parse(base_url.as_ref())
            .with_context(|| format!("Invalid API base url: {}", base_url.as_ref()))?;
        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_owned(),
            ..self
        })
    }

    /// A stalled request fails after `timeout` instead of hanging the caller.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub fn spec(&self) -> APISpecification {
        self.spec
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) async fn generate(
        &self,
        prompt: String,
        config: LangModelInferConfig,
    ) -> anyhow::Result<String> {
        let (req, parse): (_, fn(serde_json::Value) -> anyhow::Result<String>) = match self.spec {
            APISpecification::Gemini => (
                gemini::make_generate_request(self, &prompt, &config),
                gemini::parse_generate_response,
            ),
            APISpecification::ChatCompletion => (
                chat_completion::make_generate_request(self, &prompt, &config),
                chat_completion::parse_generate_response,
            ),
        };
        parse(send_json(req.timeout(self.timeout)).await?)
    }

    pub(crate) async fn embed(&self, text: String) -> anyhow::Result<Embedding> {
        let (req, parse): (_, fn(serde_json::Value) -> anyhow::Result<Embedding>) = match self.spec
        {
            APISpecification::Gemini => (
                gemini::make_embed_request(self, &text),
                gemini::parse_embed_response,
            ),
            APISpecification::ChatCompletion => (
                chat_completion::make_embed_request(self, &text),
                chat_completion::parse_embed_response,
            ),
        };
        parse(send_json(req.timeout(self.timeout)).await?)
    }
}

async fn send_json(req: reqwest::RequestBuilder) -> anyhow::Result<serde_json::Value> {
    let resp = req.send().await.context("Request failed")?;
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        bail!("Request failed: {} - {}", status, text);
    }
    resp.json::<serde_json::Value>()
        .await
        .context("Response is not valid JSON")
}
