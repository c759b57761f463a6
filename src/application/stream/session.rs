//! Transport session task.
//!
//! One spawned task owns the read half of the current connection and runs
//! the connect → authenticate → replay → receive cycle. The write half is
//! published to [`Shared`] only once the handshake and replay are done, so
//! caller sends never overtake them.

use std::sync::Arc;

use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::sync::{watch, Notify};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use super::backoff::ReconnectSchedule;
use super::registry::SubscriptionRegistry;
use super::router::{BalanceTable, MessageRouter};
use crate::domain::ClientFrame;
use crate::error::{Error, Result};
use crate::infrastructure::config::stream::{DecodeFailurePolicy, StreamConfig};
use crate::port::{
    Connection, Connector, ErrorAction, ErrorHandler, FrameReader, FrameWriter, InboundFrame,
    TokenProvider,
};

/// Lifecycle of the logical session, observable through
/// [`StreamManager::state`](super::StreamManager::state).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Opening the first connection.
    Connecting,
    /// Authenticated and subscriptions replayed.
    Connected,
    /// Waiting out the backoff before connection attempt `attempt + 1`.
    Reconnecting { attempt: u32 },
    /// The peer closed the connection or it was closed on purpose; waiting
    /// for an explicit reconnect.
    Closed,
    /// Reconnect attempts exhausted; waiting for an explicit reconnect.
    Failed,
    /// The manager was cancelled.
    Cancelled,
}

impl SessionState {
    /// True once the session will not connect again on its own.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed | Self::Cancelled)
    }
}

/// State shared between the session task and the manager handle.
pub(crate) struct Shared {
    pub(crate) writer: tokio::sync::Mutex<Option<Box<dyn FrameWriter>>>,
    pub(crate) registry: Mutex<SubscriptionRegistry>,
    pub(crate) state: watch::Sender<SessionState>,
    pub(crate) balances: BalanceTable,
    pub(crate) reconnect: Notify,
}

impl Shared {
    pub(crate) fn set_state(&self, state: SessionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            debug!(from = ?previous, to = ?state, "Session state changed");
        }
    }

    /// Take the write half and close it.
    pub(crate) async fn close_writer(&self) {
        let writer = self.writer.lock().await.take();
        if let Some(mut writer) = writer {
            if let Err(e) = writer.close().await {
                debug!(error = %e, "Error closing connection");
            }
        }
    }
}

/// Why the receive loop stopped.
enum Exit {
    /// Clean close; do not reconnect automatically.
    Closed,
    /// Connection lost or handshake failed.
    Failed(Error),
    /// A reconnect was requested by the caller or the error handler.
    Reconnect,
}

pub(crate) struct Session {
    config: StreamConfig,
    connector: Arc<dyn Connector>,
    tokens: Arc<dyn TokenProvider>,
    handler: Arc<dyn ErrorHandler>,
    router: MessageRouter,
    shared: Arc<Shared>,
    schedule: ReconnectSchedule,
}

impl Session {
    pub(crate) fn new(
        config: StreamConfig,
        connector: Arc<dyn Connector>,
        tokens: Arc<dyn TokenProvider>,
        handler: Arc<dyn ErrorHandler>,
        router: MessageRouter,
        shared: Arc<Shared>,
    ) -> Self {
        let schedule = ReconnectSchedule::new(config.reconnect.clone());
        Self {
            config,
            connector,
            tokens,
            handler,
            router,
            shared,
            schedule,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            let exit = match self.establish().await {
                Ok(reader) => self.receive(reader).await,
                Err(e) => Exit::Failed(e),
            };
            self.shared.close_writer().await;

            match exit {
                Exit::Closed => {
                    self.shared.set_state(SessionState::Closed);
                    self.wait_for_reconnect().await;
                    continue;
                }
                Exit::Failed(e) => {
                    warn!(error = %e, connector = self.connector.name(), "Connection failed");
                    self.handler.on_error(&e).await;
                }
                Exit::Reconnect => info!("Reconnecting on request"),
            }

            match self.schedule.record_failure() {
                Some(delay) => {
                    let attempt = self.schedule.attempts();
                    info!(
                        attempt,
                        max_attempts = self.schedule.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "Reconnecting after delay"
                    );
                    self.shared.set_state(SessionState::Reconnecting { attempt });
                    tokio::select! {
                        () = sleep(delay) => {}
                        () = self.shared.reconnect.notified() => debug!("Backoff cut short"),
                    }
                }
                None => {
                    let attempts = self.schedule.attempts();
                    error!(attempts, "Giving up reconnecting");
                    self.shared.set_state(SessionState::Failed);
                    self.handler
                        .on_error(&Error::ReconnectExhausted { attempts })
                        .await;
                    self.wait_for_reconnect().await;
                }
            }
        }
    }

    /// Idle until the caller asks for a new connection.
    async fn wait_for_reconnect(&mut self) {
        self.shared.reconnect.notified().await;
        info!("Reconnect requested");
        self.schedule.reset();
        self.shared.set_state(SessionState::Connecting);
    }

    /// Connect, authenticate and replay subscriptions.
    ///
    /// The writer lock is held from the replay snapshot until the write half
    /// is published, so a subscription is either in the snapshot or recorded
    /// after this connection went live.
    async fn establish(&self) -> Result<Box<dyn FrameReader>> {
        let token = self.tokens.bearer_token().await?;
        let Connection {
            mut writer,
            mut reader,
        } = self.connector.connect(&self.config.ws_url).await?;

        if let Err(e) = self.authenticate(token, writer.as_mut(), reader.as_mut()).await {
            close_rejected(writer.as_mut()).await;
            return Err(e);
        }

        let mut slot = self.shared.writer.lock().await;
        if let Err(e) = self.replay(writer.as_mut()).await {
            drop(slot);
            close_rejected(writer.as_mut()).await;
            return Err(e);
        }
        *slot = Some(writer);
        drop(slot);

        self.shared.set_state(SessionState::Connected);
        info!(url = %self.config.ws_url, "Stream connected");
        Ok(reader)
    }

    async fn authenticate(
        &self,
        token: String,
        writer: &mut dyn FrameWriter,
        reader: &mut dyn FrameReader,
    ) -> Result<()> {
        writer.send(ClientFrame::authenticate(token).to_json()?).await?;

        let auth_timeout = self.config.auth_timeout();
        let ack = timeout(auth_timeout, reader.next_frame())
            .await
            .map_err(|_| Error::HandshakeTimeout(auth_timeout))?;
        check_auth_ack(ack)?;
        debug!("Stream authenticated");
        Ok(())
    }

    /// Send the replay set in registration order. Callers hold the writer lock.
    async fn replay(&self, writer: &mut dyn FrameWriter) -> Result<()> {
        let replay = self.shared.registry.lock().replay_set();
        if !replay.is_empty() {
            debug!(subscriptions = replay.len(), "Replaying subscriptions");
        }
        for subscription in replay {
            writer.send(ClientFrame::subscribe(subscription).to_json()?).await?;
        }
        Ok(())
    }

    /// Read frames until the connection ends or a reconnect is requested.
    async fn receive(&mut self, mut reader: Box<dyn FrameReader>) -> Exit {
        self.schedule.reset();
        // A request made while connecting is satisfied by this connection.
        if self.shared.reconnect.notified().now_or_never().is_some() {
            debug!("Dropped reconnect request made before the connection went live");
        }
        loop {
            let frame = tokio::select! {
                frame = reader.next_frame() => frame,
                () = self.shared.reconnect.notified() => return Exit::Reconnect,
            };

            match frame {
                InboundFrame::Text(text) => {
                    if let Some(exit) = self.route(text).await {
                        return exit;
                    }
                }
                InboundFrame::Closed { reason } => {
                    info!(reason = ?reason, "Stream closed by server");
                    return Exit::Closed;
                }
                InboundFrame::Failed { reason } => return Exit::Failed(Error::Connection(reason)),
            }
        }
    }

    async fn route(&self, text: String) -> Option<Exit> {
        let e = match self.router.route(text).await {
            Ok(()) => return None,
            Err(e) => e,
        };

        let action = self.handler.on_error(&e).await;
        if e.is_decode_failure() {
            return match self.config.decode_failure {
                DecodeFailurePolicy::Skip => None,
                DecodeFailurePolicy::Terminate => {
                    warn!(error = %e, "Closing stream after undecodable frame");
                    Some(Exit::Closed)
                }
            };
        }
        match action {
            ErrorAction::Continue => None,
            ErrorAction::Reconnect => Some(Exit::Reconnect),
            ErrorAction::Close => Some(Exit::Closed),
        }
    }
}

async fn close_rejected(writer: &mut dyn FrameWriter) {
    if let Err(e) = writer.close().await {
        debug!(error = %e, "Error closing rejected connection");
    }
}

/// The first frame after `authenticate` must carry `"status": "success"`.
fn check_auth_ack(frame: InboundFrame) -> Result<()> {
    let text = match frame {
        InboundFrame::Text(text) => text,
        InboundFrame::Closed { reason } => {
            return Err(Error::Authentication(format!(
                "connection closed during handshake: {}",
                reason.as_deref().unwrap_or("no reason")
            )))
        }
        InboundFrame::Failed { reason } => return Err(Error::Connection(reason)),
    };

    let ack: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| Error::Authentication(format!("unreadable acknowledgment: {e}")))?;
    match ack.get("status").and_then(serde_json::Value::as_str) {
        Some("success") => Ok(()),
        _ => Err(Error::Authentication(
            ack.get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unable to authorize the websocket connection")
                .to_string(),
        )),
    }
}
