//! Jock MKT exchange integration.
//!
//! - [`client`] - REST gateway with token caching and retry handling
//! - [`stream`] - WebSocket connector backed by tokio-tungstenite
//! - [`dto`] - Request and response bodies, order form construction
//! - [`settings`] - REST endpoint and retry settings

pub mod client;
pub mod dto;
pub mod settings;
pub mod stream;

pub use client::JockmktClient;
pub use dto::{OrderQuantity, OrderRequest, MAX_LIMIT_PRICE};
pub use settings::ApiConfig;
pub use stream::WebSocketConnector;
