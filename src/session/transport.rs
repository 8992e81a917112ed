//! Pluggable control-channel transport.
//!
//! The session talks to the runner through the [`ControlTransport`] /
//! [`ControlChannel`] seam so the duplex connection can be swapped out:
//! production uses [`WsTransport`] over WebSocket, tests inject in-memory
//! doubles.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use miette::Diagnostic;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::protocol::{ControlMessage, StatusMessage};

/// Control-channel open/transport failure. Non-fatal: surfaced as a
/// notification and never retried automatically.
#[derive(Debug, Error, Diagnostic)]
pub enum ChannelError {
    #[error("failed to connect to runner at {endpoint}: {message}")]
    #[diagnostic(
        code(taskweave::session::connect),
        help("Check that the runner is reachable and TASKWEAVE_RUNNER_URL points at its /ws endpoint.")
    )]
    Connect { endpoint: String, message: String },

    #[error("control channel transport error: {message}")]
    #[diagnostic(code(taskweave::session::transport))]
    Transport { message: String },
}

/// One open duplex connection to the runner.
#[async_trait]
pub trait ControlChannel: Send {
    /// Transmit one control frame.
    async fn send(&mut self, frame: ControlMessage) -> Result<(), ChannelError>;

    /// Await the next inbound status frame. `None` means the channel is
    /// closed; frames that do not parse as status messages are skipped.
    async fn next_status(&mut self) -> Option<StatusMessage>;

    /// Close the connection. Errors during close are ignored; the channel
    /// is unusable afterwards either way.
    async fn close(&mut self);
}

/// Factory for control channels; each control action opens a fresh one.
#[async_trait]
pub trait ControlTransport: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn ControlChannel>, ChannelError>;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport to the runner's control endpoint.
pub struct WsTransport {
    endpoint: String,
}

impl WsTransport {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ControlTransport for WsTransport {
    async fn connect(&self) -> Result<Box<dyn ControlChannel>, ChannelError> {
        let (stream, _response) =
            connect_async(&self.endpoint)
                .await
                .map_err(|e| ChannelError::Connect {
                    endpoint: self.endpoint.clone(),
                    message: e.to_string(),
                })?;
        tracing::debug!(endpoint = %self.endpoint, "control channel open");
        let (tx, rx) = stream.split();
        Ok(Box::new(WsChannel { tx, rx }))
    }
}

struct WsChannel {
    tx: SplitSink<WsStream, WsMessage>,
    rx: SplitStream<WsStream>,
}

#[async_trait]
impl ControlChannel for WsChannel {
    async fn send(&mut self, frame: ControlMessage) -> Result<(), ChannelError> {
        let text = serde_json::to_string(&frame).map_err(|e| ChannelError::Transport {
            message: e.to_string(),
        })?;
        self.tx
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|e| ChannelError::Transport {
                message: e.to_string(),
            })
    }

    async fn next_status(&mut self) -> Option<StatusMessage> {
        loop {
            match self.rx.next().await? {
                Ok(WsMessage::Text(text)) => match serde_json::from_str(&text) {
                    Ok(msg) => return Some(msg),
                    Err(e) => {
                        tracing::debug!(error = %e, "ignoring unrecognized runner frame");
                    }
                },
                Ok(WsMessage::Close(_)) => return None,
                // Ping/pong are handled by tungstenite; binary frames are
                // not part of the status protocol.
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "control channel read error");
                    return None;
                }
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.tx.close().await;
    }
}
