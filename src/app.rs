use std::sync::Arc;

use crate::{
    config::{BotConfig, StartupError},
    constants::CODEQUEST_VERSION,
    engine::{CodeExplainer, DocAnswerer},
    knowledge::Knowledge,
    model::{APIModel, EmbeddingModel, LangModel, LangModelInferConfig},
    prompt::PromptLibrary,
    router::{ReplySink, Router},
    slack::{SlackClient, SocketModeListener},
};

/// The long-lived services, built once before any message is handled.
#[derive(Clone, Debug)]
pub struct App {
    pub config: BotConfig,
    pub doc: DocAnswerer,
    pub code: CodeExplainer,
}

impl App {
    /// Validates the configuration, connects the hosted models and loads the
    /// knowledge index. Every failure here is fatal.
    pub async fn init(config: BotConfig) -> Result<Self, StartupError> {
        config.validate()?;
        let lm = LangModel::from_api_model(api_model(&config, &config.model)?);
        let embedding_model =
            EmbeddingModel::from_api_model(api_model(&config, &config.embedding_model)?);

        let knowledge = Knowledge::load(&config.index_path, embedding_model)
            .await
            .map_err(|reason| StartupError::IndexUnavailable {
                path: config.index_path.clone(),
                reason,
            })?;

        Self::from_parts(config, knowledge, lm)
    }

    /// Only the code explainer. Needs a model credential but no index.
    pub fn init_code_explainer(config: &BotConfig) -> Result<CodeExplainer, StartupError> {
        config.validate()?;
        let lm = LangModel::from_api_model(api_model(config, &config.model)?);
        Ok(CodeExplainer::new(
            lm,
            Arc::new(prompt_library()?),
            LangModelInferConfig::with_temperature(config.code_temperature),
        ))
    }

    /// Assembles the handlers around already constructed capabilities.
    pub fn from_parts(
        config: BotConfig,
        knowledge: Knowledge,
        lm: LangModel,
    ) -> Result<Self, StartupError> {
        let prompts = Arc::new(prompt_library()?);
        let doc = DocAnswerer::new(
            knowledge,
            lm.clone(),
            prompts.clone(),
            config.top_k,
            LangModelInferConfig::with_temperature(config.doc_temperature),
        );
        let code = CodeExplainer::new(
            lm,
            prompts,
            LangModelInferConfig::with_temperature(config.code_temperature),
        );
        Ok(Self { config, doc, code })
    }

    pub fn router(&self, sink: Arc<dyn ReplySink>) -> Router {
        Router::new(self.doc.clone(), self.code.clone(), sink)
    }

    /// Serves Slack mentions until interrupted.
    pub async fn serve(&self) -> anyhow::Result<()> {
        let (bot_token, app_token) = self.config.slack_tokens()?;
        let client = SlackClient::new(bot_token, app_token);
        let router = Arc::new(self.router(Arc::new(client.clone())));
        let listener = SocketModeListener::new(client, router);

        log::info!("CodeQuest {CODEQUEST_VERSION} is running");
        tokio::select! {
            result = listener.run() => result,
            _ = tokio::signal::ctrl_c() => {
                log::info!("Shutting down");
                Ok(())
            }
        }
    }
}

fn api_model(config: &BotConfig, model: &str) -> Result<APIModel, StartupError> {
    let api = APIModel::new(
        config.provider,
        model,
        config.api_key.clone().unwrap_or_default(),
    );
    match &config.base_url {
        Some(url) => api
            .with_base_url(url)
            .map_err(|e| StartupError::InvalidConfig(format!("{e:#}"))),
        None => Ok(api),
    }
}

fn prompt_library() -> Result<PromptLibrary, StartupError> {
    PromptLibrary::new().map_err(|e| StartupError::InvalidConfig(e.to_string()))
}
