//! Caller-facing handle to a streaming session.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::registry::SubscriptionRegistry;
use super::router::{BalanceTable, MessageRouter};
use super::session::{Session, SessionState, Shared};
use crate::domain::{ClientFrame, Subscription};
use crate::error::{Error, Result};
use crate::infrastructure::config::stream::StreamConfig;
use crate::port::{Connector, ErrorHandler, FrameCallback, MessageSink, TokenProvider};

/// Handle to a running streaming session.
///
/// [`StreamManager::create`] spawns the session task on the current tokio
/// runtime. The registry, router and balance table live as long as the
/// handle; physical connections come and go underneath. Dropping the handle
/// aborts the task.
pub struct StreamManager {
    shared: Arc<Shared>,
    state: watch::Receiver<SessionState>,
    config: StreamConfig,
    task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl StreamManager {
    /// Validate the configuration and start connecting.
    ///
    /// `subscriptions` are recorded in order before the first connection and
    /// replayed on every connection.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn create(
        config: StreamConfig,
        connector: Arc<dyn Connector>,
        tokens: Arc<dyn TokenProvider>,
        sink: Option<Arc<dyn MessageSink>>,
        handler: Arc<dyn ErrorHandler>,
        subscriptions: Vec<Subscription>,
        callback: Option<FrameCallback>,
    ) -> Result<Self> {
        config.validate()?;

        let (state_tx, state) = watch::channel(SessionState::Connecting);
        let balances = BalanceTable::default();
        let shared = Arc::new(Shared {
            writer: tokio::sync::Mutex::new(None),
            registry: parking_lot::Mutex::new(SubscriptionRegistry::new(
                subscriptions,
                config.replay,
                config.unsubscribe,
            )),
            state: state_tx,
            balances: balances.clone(),
            reconnect: Notify::new(),
        });

        let router = MessageRouter::new(sink, callback, balances);
        let session = Session::new(
            config.clone(),
            connector,
            tokens,
            handler,
            router,
            shared.clone(),
        );
        info!(url = %config.ws_url, "Starting stream session");
        let task = tokio::spawn(session.run());

        Ok(Self {
            shared,
            state,
            config,
            task: parking_lot::Mutex::new(Some(task)),
        })
    }

    /// Record a subscription and send its frame, exactly once.
    ///
    /// Recording happens under the writer lock. With a live connection the
    /// frame goes out on it directly. Without one, a `live` replay policy
    /// leaves the frame to the next replay and this call only waits for the
    /// connection; a `static` policy polls and sends as [`send`](Self::send)
    /// does.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] when no connection became available
    /// while polling. The subscription stays recorded and is replayed on the
    /// next connection under the `live` policy.
    pub async fn subscribe(&self, subscription: Subscription) -> Result<()> {
        debug!(subscription = %subscription, "Subscribing");
        let text = ClientFrame::subscribe(subscription.clone()).to_json()?;

        let replayed = {
            let mut writer = self.shared.writer.lock().await;
            let replayed = {
                let mut registry = self.shared.registry.lock();
                registry.record(subscription);
                registry.replays_recorded()
            };
            if let Some(writer) = writer.as_mut() {
                return writer.send(text).await;
            }
            replayed
        };

        if replayed {
            self.wait_for_writer().await
        } else {
            self.send_text(text).await
        }
    }

    /// Validate untyped arguments, then [`subscribe`](Self::subscribe).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTopic`] or [`Error::InvalidSubscription`]
    /// without recording or sending anything.
    pub async fn subscribe_topic(
        &self,
        topic: &str,
        event_id: Option<&str>,
        league: Option<&str>,
    ) -> Result<()> {
        let subscription = Subscription::parse(topic, event_id, league)?;
        self.subscribe(subscription).await
    }

    /// Send an unsubscribe frame, pruning the registry if configured to.
    pub async fn unsubscribe(&self, subscription: Subscription) -> Result<()> {
        let removed = self.shared.registry.lock().forget(&subscription);
        debug!(subscription = %subscription, removed, "Unsubscribing");
        self.send(&ClientFrame::unsubscribe(subscription)).await
    }

    /// Validate untyped arguments, then [`unsubscribe`](Self::unsubscribe).
    pub async fn unsubscribe_topic(
        &self,
        topic: &str,
        event_id: Option<&str>,
        league: Option<&str>,
    ) -> Result<()> {
        let subscription = Subscription::parse(topic, event_id, league)?;
        self.unsubscribe(subscription).await
    }

    /// Unsubscribe every recorded subscription, in registration order.
    ///
    /// Under the `prune` policy the first unsubscribe of a duplicated entry
    /// removes every copy, so later copies are skipped.
    ///
    /// # Errors
    ///
    /// Stops at the first send failure.
    pub async fn unsubscribe_all(&self) -> Result<()> {
        let entries = self.shared.registry.lock().entries().to_vec();
        for subscription in entries {
            let pruned = {
                let registry = self.shared.registry.lock();
                registry.prunes() && !registry.contains(&subscription)
            };
            if pruned {
                continue;
            }
            self.unsubscribe(subscription).await?;
        }
        Ok(())
    }

    /// Serialize `message` and send it on the live connection.
    ///
    /// Without a live connection the call polls every
    /// `send_retry_interval_ms`, up to `send_max_retries` times.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] when polling runs out, or the
    /// transport's error if the write fails.
    pub async fn send<T: Serialize + ?Sized>(&self, message: &T) -> Result<()> {
        let text = serde_json::to_string(message)?;
        self.send_text(text).await
    }

    async fn send_text(&self, text: String) -> Result<()> {
        let retries = self.config.send_max_retries;

        for attempt in 0..=retries {
            {
                let mut writer = self.shared.writer.lock().await;
                if let Some(writer) = writer.as_mut() {
                    return writer.send(text).await;
                }
            }
            if attempt < retries {
                debug!(attempt = attempt + 1, "No live connection, waiting to send");
                sleep(self.config.send_retry_interval()).await;
            }
        }
        warn!(retries, "Dropping frame, no live connection");
        Err(Error::NotConnected)
    }

    /// Poll like [`send`](Self::send) until a connection is live, without
    /// writing anything.
    async fn wait_for_writer(&self) -> Result<()> {
        let retries = self.config.send_max_retries;
        for attempt in 0..=retries {
            if self.shared.writer.lock().await.is_some() {
                return Ok(());
            }
            if attempt < retries {
                debug!(attempt = attempt + 1, "Subscription queued for replay, waiting for connection");
                sleep(self.config.send_retry_interval()).await;
            }
        }
        warn!(retries, "No live connection; subscription stays queued for replay");
        Err(Error::NotConnected)
    }

    /// Drop the current connection and run the reconnect procedure. From
    /// `Closed` or `Failed` this starts a fresh connection with the retry
    /// counter reset. A request made while a connection is being
    /// established is satisfied by that connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] after [`cancel`](Self::cancel).
    pub fn reconnect(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::SessionClosed);
        }
        info!("Reconnect requested");
        self.shared.reconnect.notify_one();
        Ok(())
    }

    /// Stop the session task, wait for it to finish and close the
    /// connection. Idempotent.
    pub async fn cancel(&self) {
        let task = self.task.lock().take();
        let Some(task) = task else {
            return;
        };
        task.abort();
        if let Err(e) = task.await {
            if e.is_panic() {
                warn!(error = %e, "Stream session task panicked");
            }
        }
        self.shared.close_writer().await;
        self.shared.set_state(SessionState::Cancelled);
        info!("Stream session cancelled");
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Wait until the session state satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the state can no longer change.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&SessionState) -> bool,
    ) -> Result<SessionState> {
        let mut state = self.state.clone();
        let current = state
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| Error::SessionClosed)?;
        Ok(*current)
    }

    /// Snapshot of buying power per currency.
    #[must_use]
    pub fn balances(&self) -> HashMap<String, Decimal> {
        self.shared.balances.read().clone()
    }

    /// Every recorded subscription, in registration order.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.shared.registry.lock().entries().to_vec()
    }

    fn is_cancelled(&self) -> bool {
        self.task.lock().is_none()
    }
}

impl Drop for StreamManager {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}
