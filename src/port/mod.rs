//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! The streaming session talks to the outside world through these seams:
//!
//! - [`Connector`], [`FrameWriter`], [`FrameReader`] - the physical socket
//! - [`TokenProvider`] - bearer tokens for the authentication frame
//! - [`MessageSink`], [`FrameCallback`], [`ErrorHandler`] - consumer delivery

pub mod outbound;

pub use outbound::consumer::{ErrorAction, ErrorHandler, FrameCallback, LoggingErrorHandler, MessageSink};
pub use outbound::token::TokenProvider;
pub use outbound::transport::{Connection, Connector, FrameReader, FrameWriter, InboundFrame};
