//! Jock MKT - async client for a fantasy-sports trading exchange.
//!
//! The crate talks to the exchange two ways: a REST gateway for account data
//! and order entry, and a streaming session that stays subscribed across
//! reconnects and decodes every pushed frame into a typed record.
//!
//! # Modules
//!
//! - [`domain`] - Topics, subscriptions, wire frames and decoded records
//! - [`port`] - Traits at the seams: transport, token provider, consumers
//! - [`adapter`] - reqwest REST client and tokio-tungstenite WebSocket connector
//! - [`application`] - The streaming session manager
//! - [`infrastructure`] - Configuration loading and logging
//! - [`cli`] - Command handlers for the `jockmkt` binary
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use jockmkt::adapter::outbound::jockmkt::{JockmktClient, WebSocketConnector};
//! use jockmkt::application::stream::StreamManager;
//! use jockmkt::domain::Subscription;
//! use jockmkt::infrastructure::config::settings::{Config, Credentials};
//! use jockmkt::port::LoggingErrorHandler;
//!
//! # async fn run() -> jockmkt::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let client = Arc::new(JockmktClient::new(config.api.clone(), Credentials::from_env()?));
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!
//! let manager = StreamManager::create(
//!     config.stream.clone(),
//!     Arc::new(WebSocketConnector::new()),
//!     client,
//!     Some(Arc::new(tx)),
//!     Arc::new(LoggingErrorHandler),
//!     vec![Subscription::account()],
//!     None,
//! )?;
//! while let Some(envelope) = rx.recv().await {
//!     println!("{:?}", envelope.record());
//! }
//! manager.cancel().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Once;

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

static INIT_CRYPTO: Once = Once::new();

/// Install the ring rustls provider. Call before opening TLS connections.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
