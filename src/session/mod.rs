//! Execution session: the duplex control channel to the external runner.
//!
//! An [`ExecutionSession`] owns at most one live control channel per
//! editing session. `run` sends `START` with the compiled document and
//! attaches a reader that forwards inbound [`NodeUpdate`]s to the session's
//! update channel; `pause`/`resume` open a fresh channel and send exactly
//! one control frame. Issuing a new control action implicitly closes the
//! previous channel. Closure is hard cancellation: in-flight messages on
//! the old channel are discarded, never drained.
//!
//! A control frame is only ever sent after the connect future resolves, so
//! a `START` on a half-open channel is impossible by construction.

mod protocol;
mod transport;

pub use protocol::{ControlMessage, NodeUpdate, StatusMessage};
pub use transport::{ChannelError, ControlChannel, ControlTransport, WsTransport};

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::document::WorkflowDocument;
use crate::notices::Notice;

/// Lifecycle of the control-channel slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelState {
    #[default]
    Idle,
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Channel(#[from] ChannelError),

    #[error("failed to serialize workflow document: {0}")]
    #[diagnostic(code(taskweave::session::serialize))]
    Serialize(#[from] serde_json::Error),
}

enum ActiveChannel {
    /// `run` channel: a spawned reader owns the connection and forwards
    /// status frames until it closes.
    Reader(JoinHandle<()>),
    /// `pause`/`resume` channel: held open in the slot, no reader attached.
    Held(Box<dyn ControlChannel>),
}

/// Owns the exclusive control-channel slot and the inbound status feed.
///
/// The slot has replace-and-close-previous semantics: it is an owned
/// resource field, never module-level state. Dropping the session aborts
/// any live reader, so the channel is always released on exit.
pub struct ExecutionSession {
    transport: Arc<dyn ControlTransport>,
    state: ChannelState,
    current: Option<ActiveChannel>,
    updates_tx: flume::Sender<NodeUpdate>,
    updates_rx: flume::Receiver<NodeUpdate>,
    notices: Option<flume::Sender<Notice>>,
}

impl ExecutionSession {
    #[must_use]
    pub fn new(transport: Arc<dyn ControlTransport>) -> Self {
        let (updates_tx, updates_rx) = flume::unbounded();
        Self {
            transport,
            state: ChannelState::Idle,
            current: None,
            updates_tx,
            updates_rx,
            notices: None,
        }
    }

    /// Attach a notice sender for user-facing open/error notifications.
    #[must_use]
    pub fn with_notices(mut self, notices: flume::Sender<Notice>) -> Self {
        self.notices = Some(notices);
        self
    }

    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Receiver for inbound per-task status updates, in strict arrival
    /// order. Drained by the single event-processing context that owns the
    /// graph.
    #[must_use]
    pub fn updates(&self) -> flume::Receiver<NodeUpdate> {
        self.updates_rx.clone()
    }

    /// Compile-side entry point: close any existing channel, open a new
    /// one, send `START` with the serialized document, and start forwarding
    /// inbound status frames.
    pub async fn run(&mut self, doc: &WorkflowDocument) -> Result<(), SessionError> {
        let workflow = doc.to_json_pretty()?;
        let mut channel = self.open().await?;
        self.checked(channel.send(ControlMessage::Start { workflow }).await)?;
        self.notify(Notice::success("Workflow execution started"));

        let updates_tx = self.updates_tx.clone();
        let handle = tokio::spawn(async move {
            while let Some(StatusMessage::NodeUpdate(update)) = channel.next_status().await {
                if updates_tx.send(update).is_err() {
                    break;
                }
            }
        });
        self.current = Some(ActiveChannel::Reader(handle));
        Ok(())
    }

    /// Open a fresh channel and send a single `PAUSE` frame.
    pub async fn pause(&mut self) -> Result<(), SessionError> {
        self.control(ControlMessage::Pause, "Workflow execution paused")
            .await
    }

    /// Open a fresh channel and send a single `RESUME` frame.
    pub async fn resume(&mut self) -> Result<(), SessionError> {
        self.control(ControlMessage::Resume, "Workflow execution resumed")
            .await
    }

    /// Close the channel, whatever state it is in. Must be called when the
    /// editing session ends; also performed on drop.
    pub async fn teardown(&mut self) {
        self.close_current().await;
        self.state = ChannelState::Closed;
    }

    async fn control(&mut self, frame: ControlMessage, toast: &str) -> Result<(), SessionError> {
        let mut channel = self.open().await?;
        self.checked(channel.send(frame).await)?;
        self.notify(Notice::success(toast));
        self.current = Some(ActiveChannel::Held(channel));
        Ok(())
    }

    async fn open(&mut self) -> Result<Box<dyn ControlChannel>, SessionError> {
        self.close_current().await;
        self.state = ChannelState::Connecting;
        match self.transport.connect().await {
            Ok(channel) => {
                self.state = ChannelState::Open;
                Ok(channel)
            }
            Err(e) => {
                self.state = ChannelState::Closed;
                self.notify(Notice::error("Runner connection error"));
                tracing::warn!(error = %e, "control channel connect failed");
                Err(e.into())
            }
        }
    }

    fn checked(&mut self, result: Result<(), ChannelError>) -> Result<(), SessionError> {
        if let Err(e) = result {
            self.state = ChannelState::Closed;
            self.notify(Notice::error("Runner connection error"));
            tracing::warn!(error = %e, "control frame send failed");
            return Err(e.into());
        }
        Ok(())
    }

    async fn close_current(&mut self) {
        match self.current.take() {
            // Hard cancellation: the reader is aborted, not drained, so
            // in-flight frames on the old channel are discarded.
            Some(ActiveChannel::Reader(handle)) => {
                handle.abort();
                let _ = handle.await;
            }
            Some(ActiveChannel::Held(mut channel)) => channel.close().await,
            None => {}
        }
    }

    fn notify(&self, notice: Notice) {
        if let Some(tx) = &self.notices {
            let _ = tx.send(notice);
        }
    }
}

impl Drop for ExecutionSession {
    fn drop(&mut self) {
        match self.current.take() {
            Some(ActiveChannel::Reader(handle)) => handle.abort(),
            // Held channel closes when its socket drops.
            Some(ActiveChannel::Held(_)) | None => {}
        }
    }
}
