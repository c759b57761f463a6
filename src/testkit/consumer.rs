//! Recording consumers for asserting what a session delivered.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::Envelope;
use crate::error::Error;
use crate::port::{ErrorAction, ErrorHandler, MessageSink};

/// Keeps every delivered envelope.
#[derive(Debug, Default)]
pub struct RecordingSink {
    envelopes: Mutex<Vec<Envelope>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn envelopes(&self) -> Vec<Envelope> {
        self.envelopes.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.envelopes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.lock().is_empty()
    }

    /// Poll until at least `count` envelopes arrived or two seconds pass.
    pub async fn wait_for(&self, count: usize) -> Vec<Envelope> {
        for _ in 0..400 {
            if self.len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.envelopes()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn deliver(&self, envelope: Envelope) {
        self.envelopes.lock().push(envelope);
    }
}

/// Records the `Debug` form of every error and answers with a fixed action.
#[derive(Debug, Default)]
pub struct RecordingErrorHandler {
    action: ErrorAction,
    errors: Mutex<Vec<String>>,
}

impl RecordingErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action(action: ErrorAction) -> Self {
        Self {
            action,
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    /// How many recorded errors contain `needle`, e.g. a variant name.
    pub fn count(&self, needle: &str) -> usize {
        self.errors
            .lock()
            .iter()
            .filter(|error| error.contains(needle))
            .count()
    }

    /// Poll until an error containing `needle` was recorded or two seconds pass.
    pub async fn wait_for(&self, needle: &str) -> bool {
        for _ in 0..400 {
            if self.count(needle) > 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }
}

#[async_trait]
impl ErrorHandler for RecordingErrorHandler {
    async fn on_error(&self, error: &Error) -> ErrorAction {
        self.errors.lock().push(format!("{error:?}"));
        self.action
    }
}
