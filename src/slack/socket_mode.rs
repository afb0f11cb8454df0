use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use futures::{SinkExt as _, StreamExt as _};
use tokio_tungstenite::tungstenite::Message;

use crate::{
    router::Router,
    slack::{
        SlackClient,
        event::{Envelope, EnvelopeKind},
    },
    value::IncomingMessage,
};

/// What the listener does with one text frame.
#[derive(Debug, PartialEq)]
pub enum FrameAction {
    Continue {
        ack: Option<String>,
        mention: Option<IncomingMessage>,
    },
    Reconnect(Option<String>),
}

/// Decides how to react to a text frame. Every envelope that carries an id
/// is acknowledged, whether or not it is dispatched.
pub fn process_frame(text: &str) -> anyhow::Result<FrameAction> {
    let envelope = Envelope::parse(text).context("Malformed Socket Mode envelope")?;
    if envelope.kind == EnvelopeKind::Disconnect {
        return Ok(FrameAction::Reconnect(envelope.reason));
    }
    let ack = envelope.ack();
    let mention = match envelope.app_mention() {
        Ok(mention) => mention,
        Err(e) => {
            log::warn!("Ignoring unreadable event: {e:#}");
            None
        }
    };
    Ok(FrameAction::Continue { ack, mention })
}

/// Receives mentions over Socket Mode and hands each one to the router on
/// its own task. Reconnects whenever Slack drops or refreshes the socket.
pub struct SocketModeListener {
    client: SlackClient,
    router: Arc<Router>,
    reconnect_delay: Duration,
}

impl SocketModeListener {
    pub fn new(client: SlackClient, router: Arc<Router>) -> Self {
        Self {
            client,
            router,
            reconnect_delay: Duration::from_secs(2),
        }
    }

    pub fn with_reconnect_delay(self, reconnect_delay: Duration) -> Self {
        Self {
            reconnect_delay,
            ..self
        }
    }

    /// Runs until the task is cancelled.
    pub async fn run(&self) -> anyhow::Result<()> {
        loop {
            match self.run_connection().await {
                Ok(()) => log::info!("Socket Mode connection closed, reconnecting"),
                Err(e) => log::warn!("Socket Mode connection failed: {e:#}"),
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn run_connection(&self) -> anyhow::Result<()> {
        let url = self.client.open_connection().await?;
        let (socket, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .context("Failed to open Socket Mode WebSocket")?;
        log::info!("Connected to Slack Socket Mode");
        let (mut write, mut read) = socket.split();

        while let Some(frame) = read.next().await {
            let text = match frame.context("Socket Mode read failed")? {
                Message::Text(text) => text,
                Message::Close(_) => return Ok(()),
                _ => continue,
            };
            match process_frame(&text) {
                Ok(FrameAction::Continue { ack, mention }) => {
                    if let Some(ack) = ack {
                        write
                            .send(Message::Text(ack))
                            .await
                            .context("Failed to acknowledge envelope")?;
                    }
                    if let Some(message) = mention {
                        let router = self.router.clone();
                        tokio::spawn(async move { router.handle(message).await });
                    }
                }
                Ok(FrameAction::Reconnect(reason)) => {
                    log::info!(
                        "Slack requested disconnect: {}",
                        reason.as_deref().unwrap_or("no reason")
                    );
                    return Ok(());
                }
                Err(e) => log::warn!("{e:#}"),
            }
        }
        Ok(())
    }
}
