use std::time::Duration;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// A non-success response from the REST API.
///
/// `code` and `message` come from the `{"error": ..., "message": ...}` body
/// when the server sends one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("API error {status} ({code}): {message}")]
pub struct ApiError {
    pub status: u16,
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Hint shown alongside well-known error codes.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        let hint = match self.code.as_str() {
            "bad_request" => "check for a missing or misspelled parameter",
            "not_authorized" => "check the API key and secret, or that the token is valid",
            "event_status" => "the event is not open for trading",
            "invalid_entry" => "join the event before trading",
            "rate_limit" => "request budget exhausted until the next clock minute",
            "request_failed" => "the entry already exists or the order was already deleted",
            "insufficient_funds" => "insufficient funds for this order",
            "mixed_position" => "close the current position before placing this order",
            _ => return None,
        };
        Some(hint)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The streaming handshake was rejected.
    #[error("websocket authentication failed: {0}")]
    Authentication(String),

    #[error("no authentication acknowledgment within {0:?}")]
    HandshakeTimeout(Duration),

    /// Credentials were refused by the token endpoint.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("invalid topic '{topic}', choose one of: {valid}")]
    InvalidTopic { topic: String, valid: String },

    #[error("invalid '{topic}' subscription: {reason}")]
    InvalidSubscription { topic: String, reason: String },

    /// The server pushed an `error`-tagged frame.
    #[error("stream error frame: {0}")]
    Stream(serde_json::Value),

    #[error("unknown message type '{0}'")]
    UnknownMessageType(String),

    #[error("unknown league '{0}'")]
    UnknownLeague(String),

    #[error("failed to decode '{tag}' payload: {reason}")]
    Decode { tag: String, reason: String },

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("no live websocket connection")]
    NotConnected,

    #[error("gave up reconnecting after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    #[error("streaming session has shut down")]
    SessionClosed,

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),
}

impl Error {
    /// True for failures caused by an inbound payload the decoder could not handle.
    #[must_use]
    pub const fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Self::UnknownMessageType(_) | Self::UnknownLeague(_) | Self::Decode { .. } | Self::Json(_)
        )
    }

    /// True for failures of the physical connection or its handshake.
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::Authentication(_)
                | Self::HandshakeTimeout(_)
                | Self::WebSocket(_)
                | Self::Connection(_)
                | Self::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(err))
    }
}
