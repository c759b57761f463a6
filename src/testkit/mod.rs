//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`transport`]: [`ScriptedConnector`](transport::ScriptedConnector), an
//!   in-memory connector with per-connection write logs.
//! - [`token`]: fixed token providers.
//! - [`consumer`]: recording sink and error handler.
//! - [`config`]: canonical fast stream configuration.
//! - [`frames`]: inbound frame builders.

pub mod config;
pub mod consumer;
pub mod frames;
pub mod token;
pub mod transport;
