//! Consumer-facing delivery ports.
//!
//! Decoded envelopes go to a [`MessageSink`]; the raw text of each routed
//! frame goes to an optional [`FrameCallback`]; errors raised inside the
//! receive loop go to an [`ErrorHandler`].

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::Envelope;
use crate::error::Error;

/// Receives every decoded envelope, in arrival order.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, envelope: Envelope);
}

#[async_trait]
impl MessageSink for mpsc::Sender<Envelope> {
    async fn deliver(&self, envelope: Envelope) {
        if self.send(envelope).await.is_err() {
            debug!("Envelope receiver dropped");
        }
    }
}

#[async_trait]
impl MessageSink for mpsc::UnboundedSender<Envelope> {
    async fn deliver(&self, envelope: Envelope) {
        if self.send(envelope).is_err() {
            debug!("Envelope receiver dropped");
        }
    }
}

/// Invoked with the raw text of each routed frame, after sink delivery.
pub type FrameCallback = Arc<dyn Fn(String) -> BoxFuture<'static, ()> + Send + Sync>;

/// What the session does after the handler has seen an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorAction {
    /// Keep the connection open and keep reading.
    #[default]
    Continue,
    /// Drop the connection and run the reconnect procedure.
    Reconnect,
    /// Close the connection cleanly without reconnecting.
    Close,
}

/// Receives errors that surface inside the receive loop.
///
/// The returned action is honoured for server `error` frames. For decode
/// failures the configured decode-failure policy decides; for transport
/// failures and exhausted retries the call is informational.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    async fn on_error(&self, error: &Error) -> ErrorAction;
}

/// Handler that logs every error and keeps the connection open.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorHandler;

#[async_trait]
impl ErrorHandler for LoggingErrorHandler {
    async fn on_error(&self, error: &Error) -> ErrorAction {
        warn!(error = %error, "Stream error");
        ErrorAction::Continue
    }
}
