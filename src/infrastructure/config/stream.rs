//! Streaming session configuration and behaviour policies.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::domain::Subscription;
use crate::error::{ConfigError, Error, Result};

/// Which subscriptions a reconnect replays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayPolicy {
    /// Only the list supplied when the manager was created.
    Static,
    /// The registry as it stands at reconnect time.
    #[default]
    Live,
}

/// Whether `unsubscribe` removes entries from the replay set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsubscribePolicy {
    /// Keep the entry; it is replayed on the next reconnect.
    #[default]
    Retain,
    /// Remove every matching entry from the live registry.
    Prune,
}

/// What the receive loop does after a frame fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeFailurePolicy {
    /// Report the failure and keep reading.
    #[default]
    Skip,
    /// Report the failure and close the connection without reconnecting.
    Terminate,
}

/// Reconnect schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    /// Failures tolerated before the session gives up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before each retry, indexed by attempt; the last entry repeats.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: Vec<u64>,
}

const fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_ms() -> Vec<u64> {
    vec![100, 3_000, 10_000, 30_000, 60_000]
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// A subscription as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubscriptionSpec {
    pub topic: String,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub league: Option<String>,
}

impl SubscriptionSpec {
    /// Validate against the topic argument table.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTopic` or `InvalidSubscription`.
    pub fn to_subscription(&self) -> Result<Subscription> {
        Subscription::parse(&self.topic, self.event_id.as_deref(), self.league.as_deref())
    }
}

/// Streaming connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Time allowed for the authentication acknowledgment.
    #[serde(default = "default_auth_timeout_ms")]
    pub auth_timeout_ms: u64,
    /// Poll interval while `send` waits for a live connection.
    #[serde(default = "default_send_retry_interval_ms")]
    pub send_retry_interval_ms: u64,
    /// Polls before `send` gives up with `NotConnected`.
    #[serde(default = "default_send_max_retries")]
    pub send_max_retries: u32,
    #[serde(default)]
    pub replay: ReplayPolicy,
    #[serde(default)]
    pub unsubscribe: UnsubscribePolicy,
    #[serde(default)]
    pub decode_failure: DecodeFailurePolicy,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Subscriptions opened when the session starts.
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionSpec>,
}

fn default_ws_url() -> String {
    "wss://api.jockmkt.net/streaming/".into()
}

const fn default_auth_timeout_ms() -> u64 {
    10_000
}

const fn default_send_retry_interval_ms() -> u64 {
    1_000
}

const fn default_send_max_retries() -> u32 {
    5
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            auth_timeout_ms: default_auth_timeout_ms(),
            send_retry_interval_ms: default_send_retry_interval_ms(),
            send_max_retries: default_send_max_retries(),
            replay: ReplayPolicy::default(),
            unsubscribe: UnsubscribePolicy::default(),
            decode_failure: DecodeFailurePolicy::default(),
            reconnect: ReconnectConfig::default(),
            subscriptions: Vec::new(),
        }
    }
}

impl StreamConfig {
    #[must_use]
    pub const fn auth_timeout(&self) -> Duration {
        Duration::from_millis(self.auth_timeout_ms)
    }

    #[must_use]
    pub const fn send_retry_interval(&self) -> Duration {
        Duration::from_millis(self.send_retry_interval_ms)
    }

    /// Configured subscriptions, validated, in file order.
    ///
    /// # Errors
    ///
    /// Returns the first subscription that violates the topic table.
    pub fn initial_subscriptions(&self) -> Result<Vec<Subscription>> {
        self.subscriptions
            .iter()
            .map(SubscriptionSpec::to_subscription)
            .collect()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.ws_url).map_err(|e| ConfigError::InvalidValue {
            field: "stream.ws_url",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "wss" | "ws") {
            return Err(ConfigError::InvalidValue {
                field: "stream.ws_url",
                reason: format!("scheme must be wss or ws, got {}", url.scheme()),
            }
            .into());
        }
        if self.auth_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stream.auth_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.send_retry_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stream.send_retry_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.reconnect.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stream.reconnect.max_attempts",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.reconnect.backoff_ms.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "stream.reconnect.backoff_ms",
                reason: "must list at least one delay".to_string(),
            }
            .into());
        }
        for spec in &self.subscriptions {
            spec.to_subscription().map_err(|e| match e {
                Error::InvalidTopic { .. } | Error::InvalidSubscription { .. } => {
                    Error::Config(ConfigError::InvalidValue {
                        field: "stream.subscriptions",
                        reason: e.to_string(),
                    })
                }
                other => other,
            })?;
        }
        Ok(())
    }
}
