//! In-memory [`Connector`] for driving a stream session without a network.
//!
//! Each `connect()` pops the next [`Script`] entry (falling back to a fixed
//! default once the queue is empty) and, when accepted, opens a channel-backed
//! connection. A [`TransportHandle`] pushes inbound frames into the most
//! recent connection and records what the session wrote on each one.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::port::{Connection, Connector, FrameReader, FrameWriter, InboundFrame};

/// How one connection attempt plays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Connect and acknowledge authentication.
    Accept,
    /// Connect and answer `authenticate` with an error status.
    RejectAuth,
    /// Connect but never acknowledge authentication.
    SilentAuth,
    /// Fail to connect.
    Refuse,
}

struct ConnectionLog {
    inbound: mpsc::UnboundedSender<InboundFrame>,
    sent: Vec<String>,
    closed: bool,
}

struct Wire {
    script: VecDeque<Script>,
    fallback: Script,
    connect_calls: u32,
    connections: Vec<ConnectionLog>,
}

/// Scripted connector. Clone the [`TransportHandle`] before handing the
/// connector to a session.
#[derive(Clone)]
pub struct ScriptedConnector {
    wire: Arc<Mutex<Wire>>,
}

impl ScriptedConnector {
    /// Every attempt is accepted.
    pub fn new() -> Self {
        Self::with_fallback(Script::Accept)
    }

    /// Attempts beyond the queued script play out as `fallback`.
    pub fn with_fallback(fallback: Script) -> Self {
        Self {
            wire: Arc::new(Mutex::new(Wire {
                script: VecDeque::new(),
                fallback,
                connect_calls: 0,
                connections: Vec::new(),
            })),
        }
    }

    /// Queue outcomes for the next attempts, in order.
    #[must_use]
    pub fn with_script(self, script: impl IntoIterator<Item = Script>) -> Self {
        self.wire.lock().script.extend(script);
        self
    }

    pub fn handle(&self) -> TransportHandle {
        TransportHandle {
            wire: self.wire.clone(),
        }
    }
}

impl Default for ScriptedConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _url: &str) -> Result<Connection> {
        let mut wire = self.wire.lock();
        wire.connect_calls += 1;
        let fallback = wire.fallback;
        let script = wire.script.pop_front().unwrap_or(fallback);

        let (tx, rx) = mpsc::unbounded_channel();
        match script {
            Script::Refuse => {
                return Err(Error::Connection("connection refused".into()));
            }
            Script::Accept => {
                let _ = tx.send(InboundFrame::Text(r#"{"status":"success"}"#.into()));
            }
            Script::RejectAuth => {
                let _ = tx.send(InboundFrame::Text(
                    r#"{"status":"error","message":"invalid token"}"#.into(),
                ));
            }
            Script::SilentAuth => {}
        }

        let index = wire.connections.len();
        wire.connections.push(ConnectionLog {
            inbound: tx,
            sent: Vec::new(),
            closed: false,
        });

        Ok(Connection::new(
            ScriptedWriter {
                wire: self.wire.clone(),
                index,
            },
            ScriptedReader { inbound: rx },
        ))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

struct ScriptedWriter {
    wire: Arc<Mutex<Wire>>,
    index: usize,
}

#[async_trait]
impl FrameWriter for ScriptedWriter {
    async fn send(&mut self, text: String) -> Result<()> {
        let mut wire = self.wire.lock();
        let log = &mut wire.connections[self.index];
        if log.closed {
            return Err(Error::Connection("write on closed connection".into()));
        }
        log.sent.push(text);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.wire.lock().connections[self.index].closed = true;
        Ok(())
    }
}

struct ScriptedReader {
    inbound: mpsc::UnboundedReceiver<InboundFrame>,
}

#[async_trait]
impl FrameReader for ScriptedReader {
    async fn next_frame(&mut self) -> InboundFrame {
        self.inbound.recv().await.unwrap_or(InboundFrame::Failed {
            reason: "scripted connection dropped".into(),
        })
    }
}

/// Test-side control of a [`ScriptedConnector`].
#[derive(Clone)]
pub struct TransportHandle {
    wire: Arc<Mutex<Wire>>,
}

impl TransportHandle {
    /// How many times `connect()` was called, refused attempts included.
    pub fn connect_calls(&self) -> u32 {
        self.wire.lock().connect_calls
    }

    /// How many connections were opened.
    pub fn connections(&self) -> usize {
        self.wire.lock().connections.len()
    }

    /// Push a text frame into the latest connection.
    pub fn push(&self, text: impl Into<String>) {
        self.push_frame(InboundFrame::Text(text.into()));
    }

    /// Push a JSON frame into the latest connection.
    pub fn push_json(&self, value: &Value) {
        self.push(value.to_string());
    }

    /// Close the latest connection from the server side.
    pub fn close(&self, reason: Option<&str>) {
        self.push_frame(InboundFrame::Closed {
            reason: reason.map(str::to_string),
        });
    }

    /// Break the latest connection.
    pub fn fail(&self, reason: &str) {
        self.push_frame(InboundFrame::Failed {
            reason: reason.to_string(),
        });
    }

    fn push_frame(&self, frame: InboundFrame) {
        if let Some(log) = self.wire.lock().connections.last() {
            let _ = log.inbound.send(frame);
        }
    }

    /// Frames written on connection `index`, in order.
    pub fn sent(&self, index: usize) -> Vec<String> {
        self.wire
            .lock()
            .connections
            .get(index)
            .map(|log| log.sent.clone())
            .unwrap_or_default()
    }

    /// Frames written on connection `index`, parsed.
    pub fn sent_json(&self, index: usize) -> Vec<Value> {
        self.sent(index)
            .iter()
            .filter_map(|text| serde_json::from_str(text).ok())
            .collect()
    }

    /// Whether the session closed connection `index`.
    pub fn is_closed(&self, index: usize) -> bool {
        self.wire
            .lock()
            .connections
            .get(index)
            .is_some_and(|log| log.closed)
    }

    /// Poll until connection `index` has at least `count` written frames or
    /// two seconds pass; returns what was written.
    pub async fn wait_for_sent(&self, index: usize, count: usize) -> Vec<Value> {
        for _ in 0..400 {
            let sent = self.sent_json(index);
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.sent_json(index)
    }

    /// Poll until at least `count` connections were opened or two seconds pass.
    pub async fn wait_for_connections(&self, count: usize) -> usize {
        for _ in 0..400 {
            if self.connections() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.connections()
    }
}
