use std::time::Duration;

use anyhow::{Context as _, bail};
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{constants::DEFAULT_REQUEST_TIMEOUT, router::ReplySink};

/// Slack cuts very long messages, so replies are posted in pieces below this.
pub const MAX_MESSAGE_LEN: usize = 4000;

/// Splits `text` at line boundaries into pieces of at most `max_len` chars.
/// Blank lines are kept, including at the start of a piece, so joining the
/// pieces with `\n` restores the text. A single line longer than `max_len`
/// is cut at char boundaries. Pieces with nothing but whitespace are dropped
/// since Slack refuses empty messages.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.chars().count() <= max_len {
        return vec![text.to_owned()];
    }

    let mut pieces = Vec::new();
    // Open piece and its length in chars.
    let mut current: Option<(String, usize)> = None;
    for line in text.lines() {
        let line_len = line.chars().count();
        if let Some((_, len)) = &current
            && len + 1 + line_len > max_len
        {
            pieces.extend(current.take().map(|(piece, _)| piece));
        }
        if line_len > max_len {
            let chars = line.chars().collect::<Vec<_>>();
            pieces.extend(chars.chunks(max_len).map(|c| c.iter().collect::<String>()));
            continue;
        }
        match &mut current {
            Some((piece, len)) => {
                piece.push('\n');
                piece.push_str(line);
                *len += 1 + line_len;
            }
            None => current = Some((line.to_owned(), line_len)),
        }
    }
    pieces.extend(current.map(|(piece, _)| piece));
    pieces.retain(|piece| !piece.trim().is_empty());
    pieces
}

/// Minimal Slack Web API client: opening Socket Mode connections with the
/// app-level token and posting messages with the bot token.
#[derive(Clone)]
pub struct SlackClient {
    bot_token: String,
    app_token: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SlackClient {
    pub const DEFAULT_URL: &'static str = "https://slack.com/api";

    pub fn new(bot_token: impl Into<String>, app_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            app_token: app_token.into(),
            base_url: Self::DEFAULT_URL.to_owned(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(self, base_url: impl AsRef<str>) -> anyhow::Result<Self> {
        let parsed = url::Url::parse(base_url.as_ref())
            .with_context(|| format!("Invalid Slack API url: {}", base_url.as_ref()))?;
        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_owned(),
            ..self
        })
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Requests a fresh Socket Mode WebSocket url.
    pub async fn open_connection(&self) -> anyhow::Result<String> {
        let body = self
            .call("apps.connections.open", &self.app_token, None)
            .await?;
        body.get("url")
            .and_then(|u| u.as_str())
            .map(str::to_owned)
            .context("apps.connections.open returned no url")
    }

    pub async fn post_message(
        &self,
        channel: &str,
        thread_ts: &str,
        text: &str,
    ) -> anyhow::Result<()> {
        self.call(
            "chat.postMessage",
            &self.bot_token,
            Some(json!({
                "channel": channel,
                "thread_ts": thread_ts,
                "text": text,
            })),
        )
        .await?;
        Ok(())
    }

    async fn call(&self, method: &str, token: &str, body: Option<Value>) -> anyhow::Result<Value> {
        let mut req = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .bearer_auth(token)
            .timeout(self.timeout);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req
            .send()
            .await
            .with_context(|| format!("Failed to call {method}"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("{method} failed: {status}");
        }
        let body: Value = resp
            .json()
            .await
            .with_context(|| format!("{method} returned invalid JSON"))?;
        if body.get("ok").and_then(|ok| ok.as_bool()) != Some(true) {
            let error = body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unknown_error");
            bail!("{method} returned ok=false: {error}");
        }
        Ok(body)
    }
}

#[async_trait]
impl ReplySink for SlackClient {
    async fn post_reply(
        &self,
        conversation_id: &str,
        reply_target: &str,
        text: &str,
    ) -> anyhow::Result<()> {
        for piece in split_message(text, MAX_MESSAGE_LEN) {
            self.post_message(conversation_id, reply_target, &piece)
                .await?;
        }
        Ok(())
    }
}
