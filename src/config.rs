use std::path::PathBuf;

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        DEFAULT_CODE_TEMPERATURE, DEFAULT_DOC_TEMPERATURE, DEFAULT_EMBEDDING_MODEL,
        DEFAULT_INDEX_PATH, DEFAULT_LANG_MODEL, DEFAULT_TOP_K,
    },
    model::APISpecification,
};

/// Everything fixed at startup. Filled from flags and environment variables;
/// secrets are never serialized or printed.
#[derive(Clone, PartialEq, Serialize, Deserialize, Args)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Wire format of the hosted model API
    #[arg(long, env = "CODEQUEST_PROVIDER", default_value = "gemini")]
    pub provider: APISpecification,

    /// Generative model name
    #[arg(long, env = "CODEQUEST_MODEL", default_value = DEFAULT_LANG_MODEL)]
    pub model: String,

    /// Embedding model the index was built with
    #[arg(long, env = "CODEQUEST_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    pub embedding_model: String,

    /// Model API key. Defaults to GOOGLE_API_KEY or OPENAI_API_KEY, by provider
    #[arg(long, hide_env_values = true)]
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Override the model API endpoint
    #[arg(long, env = "CODEQUEST_BASE_URL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Path of the prebuilt knowledge index
    #[arg(long, env = "CODEQUEST_INDEX_PATH", default_value = DEFAULT_INDEX_PATH)]
    pub index_path: PathBuf,

    /// Number of chunks retrieved per question
    #[arg(long, env = "CODEQUEST_TOP_K", default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    #[arg(long, env = "CODEQUEST_DOC_TEMPERATURE", default_value_t = DEFAULT_DOC_TEMPERATURE)]
    pub doc_temperature: f64,

    #[arg(long, env = "CODEQUEST_CODE_TEMPERATURE", default_value_t = DEFAULT_CODE_TEMPERATURE)]
    pub code_temperature: f64,

    #[arg(long, env = "SLACK_BOT_TOKEN", hide_env_values = true)]
    #[serde(skip)]
    pub slack_bot_token: Option<String>,

    #[arg(long, env = "SLACK_APP_TOKEN", hide_env_values = true)]
    #[serde(skip)]
    pub slack_app_token: Option<String>,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("base_url", &self.base_url)
            .field("index_path", &self.index_path)
            .field("top_k", &self.top_k)
            .field("doc_temperature", &self.doc_temperature)
            .field("code_temperature", &self.code_temperature)
            .finish_non_exhaustive()
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            provider: APISpecification::Gemini,
            model: DEFAULT_LANG_MODEL.to_owned(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_owned(),
            api_key: None,
            base_url: None,
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            top_k: DEFAULT_TOP_K,
            doc_temperature: DEFAULT_DOC_TEMPERATURE,
            code_temperature: DEFAULT_CODE_TEMPERATURE,
            slack_bot_token: None,
            slack_app_token: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to load knowledge index from {path}: {reason:#}")]
    IndexUnavailable { path: PathBuf, reason: anyhow::Error },
}

impl BotConfig {
    /// Fills `api_key` from the provider's environment variable when it was
    /// not given explicitly.
    pub fn with_env_api_key(self) -> Self {
        let api_key = self
            .api_key
            .or_else(|| std::env::var(self.provider.api_key_env()).ok());
        Self { api_key, ..self }
    }

    pub fn validate(&self) -> Result<(), StartupError> {
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(StartupError::MissingCredential(self.provider.api_key_env()));
        }
        if self.top_k == 0 {
            return Err(StartupError::InvalidConfig("top_k must be at least 1".into()));
        }
        for (name, value) in [
            ("doc_temperature", self.doc_temperature),
            ("code_temperature", self.code_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(StartupError::InvalidConfig(format!(
                    "{name} must be between 0 and 2, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Bot token and app-level token, both required to serve Slack.
    pub fn slack_tokens(&self) -> Result<(&str, &str), StartupError> {
        let bot = self
            .slack_bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(StartupError::MissingCredential("SLACK_BOT_TOKEN"))?;
        let app = self
            .slack_app_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(StartupError::MissingCredential("SLACK_APP_TOKEN"))?;
        Ok((bot, app))
    }
}
