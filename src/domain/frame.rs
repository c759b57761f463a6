//! Frames the client sends on the streaming connection.

use serde::Serialize;

use super::topic::Subscription;

/// Outbound control frame, tagged by `action`.
///
/// ```json
/// {"action": "authenticate", "authentication": {"type": "token", "token": "..."}}
/// {"action": "subscribe", "subscription": {"type": "event", "event_id": "evt_1", "league": null}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClientFrame {
    Authenticate { authentication: Authentication },
    Subscribe { subscription: Subscription },
    Unsubscribe { subscription: Subscription },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Authentication {
    Token { token: String },
}

impl ClientFrame {
    #[must_use]
    pub fn authenticate(token: impl Into<String>) -> Self {
        Self::Authenticate {
            authentication: Authentication::Token {
                token: token.into(),
            },
        }
    }

    #[must_use]
    pub fn subscribe(subscription: Subscription) -> Self {
        Self::Subscribe { subscription }
    }

    #[must_use]
    pub fn unsubscribe(subscription: Subscription) -> Self {
        Self::Unsubscribe { subscription }
    }

    /// Serialize to the JSON text sent on the wire.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
