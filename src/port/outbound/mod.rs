//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod consumer;
pub mod token;
pub mod transport;
