//! Message router: decodes inbound frames and hands them to the consumer.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::domain::{Envelope, Record};
use crate::error::Result;
use crate::port::{FrameCallback, MessageSink};

/// Buying power per currency, shared between the router and the manager
/// handle. Survives reconnects.
pub type BalanceTable = Arc<RwLock<HashMap<String, Decimal>>>;

pub struct MessageRouter {
    sink: Option<Arc<dyn MessageSink>>,
    callback: Option<FrameCallback>,
    balances: BalanceTable,
}

impl MessageRouter {
    pub fn new(
        sink: Option<Arc<dyn MessageSink>>,
        callback: Option<FrameCallback>,
        balances: BalanceTable,
    ) -> Self {
        Self {
            sink,
            callback,
            balances,
        }
    }

    /// Decode one text frame, update the balance table and deliver.
    ///
    /// The sink receives the decoded envelope first; the callback then
    /// receives the raw text.
    ///
    /// # Errors
    ///
    /// Returns the decoder's error; nothing is delivered for that frame.
    pub async fn route(&self, raw: String) -> Result<()> {
        let envelope = Envelope::from_text(&raw)?;
        trace!(tag = %envelope.tag(), "Routing frame");

        if let Record::Balance(balance) = envelope.record() {
            match balance.buying_power {
                Some(buying_power) => {
                    debug!(currency = %balance.currency, %buying_power, "Balance updated");
                    self.balances
                        .write()
                        .insert(balance.currency.clone(), buying_power);
                }
                None => debug!(currency = %balance.currency, "Balance without buying power"),
            }
        }

        if let Some(sink) = &self.sink {
            sink.deliver(envelope).await;
        }
        if let Some(callback) = &self.callback {
            callback(raw).await;
        }
        Ok(())
    }

    pub fn balances(&self) -> &BalanceTable {
        &self.balances
    }
}
