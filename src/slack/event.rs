use serde::Deserialize;

use crate::value::IncomingMessage;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    Hello,
    EventsApi,
    Disconnect,
    #[serde(other)]
    Other,
}

/// One Socket Mode frame as delivered over the WebSocket.
#[derive(Clone, Debug, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,

    #[serde(default)]
    pub envelope_id: Option<String>,

    #[serde(default)]
    pub payload: Option<serde_json::Value>,

    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct EventsApiPayload {
    #[serde(default)]
    event: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppMentionEvent {
    #[serde(default)]
    pub text: String,
    pub channel: String,
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
}

impl From<AppMentionEvent> for IncomingMessage {
    fn from(event: AppMentionEvent) -> Self {
        let reply_target = event.thread_ts.unwrap_or(event.ts);
        IncomingMessage::new(event.text, event.channel, reply_target)
    }
}

impl Envelope {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The acknowledgment Slack expects for this envelope, if it carries an id.
    pub fn ack(&self) -> Option<String> {
        self.envelope_id
            .as_ref()
            .map(|id| serde_json::json!({ "envelope_id": id }).to_string())
    }

    /// The mention carried by an `events_api` envelope. Other event types
    /// yield `None`.
    pub fn app_mention(&self) -> anyhow::Result<Option<IncomingMessage>> {
        if self.kind != EnvelopeKind::EventsApi {
            return Ok(None);
        }
        let Some(payload) = &self.payload else {
            return Ok(None);
        };
        let Some(event) = serde_json::from_value::<EventsApiPayload>(payload.clone())?.event
        else {
            return Ok(None);
        };
        if event.get("type").and_then(|t| t.as_str()) != Some("app_mention") {
            return Ok(None);
        }
        let event: AppMentionEvent = serde_json::from_value(event)?;
        Ok(Some(event.into()))
    }
}
