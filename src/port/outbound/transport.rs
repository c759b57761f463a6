//! Transport port for the streaming connection.
//!
//! A [`Connector`] opens one physical connection and hands back its two
//! halves. The session owns both halves exclusively and drops them before
//! opening the next connection.

use async_trait::async_trait;

use crate::error::Result;

/// What the read half produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// A text frame.
    Text(String),
    /// The peer closed the connection cleanly.
    Closed {
        /// Close reason sent by the peer, if any.
        reason: Option<String>,
    },
    /// The connection broke: protocol error, I/O error or the stream ended
    /// without a close handshake.
    Failed {
        /// Human-readable failure description.
        reason: String,
    },
}

/// Write half of a connection.
#[async_trait]
pub trait FrameWriter: Send {
    /// Send one text frame.
    async fn send(&mut self, text: String) -> Result<()>;

    /// Start the close handshake. Idempotent.
    async fn close(&mut self) -> Result<()>;
}

/// Read half of a connection.
#[async_trait]
pub trait FrameReader: Send {
    /// Wait for the next frame.
    ///
    /// After `Closed` or `Failed` the reader is exhausted and must not be
    /// polled again.
    async fn next_frame(&mut self) -> InboundFrame;
}

/// An open connection split into its halves.
pub struct Connection {
    pub writer: Box<dyn FrameWriter>,
    pub reader: Box<dyn FrameReader>,
}

impl Connection {
    pub fn new(writer: impl FrameWriter + 'static, reader: impl FrameReader + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            reader: Box::new(reader),
        }
    }
}

/// Opens physical connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection to `url`.
    async fn connect(&self, url: &str) -> Result<Connection>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}
