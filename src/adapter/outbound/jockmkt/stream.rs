//! Jock MKT WebSocket transport.
//!
//! [`WebSocketConnector`] opens a TLS WebSocket with tokio-tungstenite and
//! splits it into the [`FrameWriter`]/[`FrameReader`] halves the streaming
//! session drives. Pings are answered by tungstenite while the read half is
//! polled.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace};

use crate::error::Result;
use crate::port::{Connection, Connector, FrameReader, FrameWriter, InboundFrame};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens WebSocket connections to the streaming endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<Connection> {
        info!(url = %url, "Connecting to WebSocket");
        let (ws_stream, response) = connect_async(url).await?;
        info!(status = %response.status(), "WebSocket connected");

        let (sink, stream) = ws_stream.split();
        Ok(Connection::new(
            WebSocketWriter {
                sink,
                closed: false,
            },
            WebSocketReader { stream },
        ))
    }

    fn name(&self) -> &'static str {
        "websocket"
    }
}

/// Write half of a WebSocket connection.
pub struct WebSocketWriter {
    sink: SplitSink<Socket, Message>,
    closed: bool,
}

#[async_trait]
impl FrameWriter for WebSocketWriter {
    async fn send(&mut self, text: String) -> Result<()> {
        trace!(bytes = text.len(), "Sending WebSocket text frame");
        self.sink.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!("Closing WebSocket");
        self.sink.close().await?;
        Ok(())
    }
}

/// Read half of a WebSocket connection.
pub struct WebSocketReader {
    stream: SplitStream<Socket>,
}

#[async_trait]
impl FrameReader for WebSocketReader {
    async fn next_frame(&mut self) -> InboundFrame {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    trace!(bytes = text.len(), "Received WebSocket text frame");
                    return InboundFrame::Text(text);
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(frame = ?frame, "WebSocket closed by server");
                    return InboundFrame::Closed {
                        reason: frame
                            .map(|f| f.reason.to_string())
                            .filter(|reason| !reason.is_empty()),
                    };
                }
                // Ping, Pong, Binary and raw frames carry nothing for the session.
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    error!(error = %e, "WebSocket error");
                    return InboundFrame::Failed {
                        reason: e.to_string(),
                    };
                }
                None => {
                    return InboundFrame::Failed {
                        reason: "stream ended without close frame".into(),
                    };
                }
            }
        }
    }
}
