//! Application services.
//!
//! The streaming session manager lives here: it drives the outbound ports
//! (transport, token provider, consumer sinks) on behalf of the caller.

pub mod stream;
