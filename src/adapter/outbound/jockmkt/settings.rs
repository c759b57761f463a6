//! Jock MKT REST configuration.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{ConfigError, Result};

/// REST endpoint and request-handling settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Delays before retrying a 5xx response; one retry per entry.
    #[serde(default = "default_server_error_backoff_ms")]
    pub server_error_backoff_ms: Vec<u64>,
    /// Retry a rate-limited order once the next clock minute starts.
    #[serde(default = "default_order_rate_limit_retry")]
    pub order_rate_limit_retry: bool,
}

fn default_base_url() -> String {
    "https://api.jockmkt.net".into()
}

fn default_api_version() -> String {
    "v1".into()
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_server_error_backoff_ms() -> Vec<u64> {
    vec![3_000, 10_000, 30_000]
}

const fn default_order_rate_limit_retry() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            server_error_backoff_ms: default_server_error_backoff_ms(),
            order_rate_limit_retry: default_order_rate_limit_retry(),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Full URL for a versioned API path such as `account` or `orders/ord_1`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version,
            path.trim_start_matches('/')
        )
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "api.base_url",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "https" | "http") {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url",
                reason: format!("scheme must be https or http, got {}", url.scheme()),
            }
            .into());
        }
        if self.api_version.is_empty() {
            return Err(ConfigError::MissingField {
                field: "api.api_version",
            }
            .into());
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
