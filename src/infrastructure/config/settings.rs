//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all client settings.
//! Configuration is loaded from a TOML file; API credentials come only from
//! the `JOCKMKT_API_KEY` and `JOCKMKT_SECRET` environment variables.
//!
//! # Example
//!
//! ```no_run
//! use jockmkt::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::stream::StreamConfig;
use crate::adapter::outbound::jockmkt::settings::ApiConfig;
use crate::error::{ConfigError, Result};

pub const API_KEY_VAR: &str = "JOCKMKT_API_KEY";
pub const SECRET_VAR: &str = "JOCKMKT_SECRET";

/// API key pair used to obtain bearer tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
        }
    }

    /// Read credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the first unset or empty variable.
    pub fn from_env() -> Result<Self> {
        let read = |field: &'static str| {
            std::env::var(field)
                .ok()
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingField { field })
        };
        Ok(Self {
            api_key: read(API_KEY_VAR)?,
            secret: read(SECRET_VAR)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Main client configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Every table is optional.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// REST endpoint and retry settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Streaming endpoint, reconnect schedule, policies and initial subscriptions.
    #[serde(default)]
    pub stream: StreamConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        self.logging.validate()?;
        self.api.validate()?;
        self.stream.validate()?;
        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
