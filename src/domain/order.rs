//! Orders, public order-book activity and trades.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de::empty_object_as_none;
use super::entity::Entity;
use super::market::{Event, Tradeable};

/// Order side for outbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trading phase an order targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Ipo,
    Live,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Ipo => "ipo",
            Phase::Live => "live",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the account's own orders.
///
/// Only the owner sees `limit_price`; that field is what separates this
/// record from a [`PublicOrder`] on the stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: String,
    pub account: Option<Map<String, Value>>,
    pub tradeable_id: Option<String>,
    pub entity_id: Option<String>,
    pub event_id: Option<String>,
    pub status: Option<String>,
    pub side: Option<String>,
    #[serde(rename = "type")]
    pub order_type: Option<String>,
    pub phase: Option<String>,
    pub direction: Option<String>,
    pub time_in_force: Option<String>,
    pub quantity: Option<i64>,
    pub limit_price: Option<Decimal>,
    pub cost_basis: Decimal,
    pub fee_paid: Decimal,
    pub proceeds: Decimal,
    pub filled_quantity: i64,
    #[serde(deserialize_with = "empty_object_as_none")]
    pub tradeable: Option<Tradeable>,
    #[serde(deserialize_with = "empty_object_as_none")]
    pub entity: Option<Entity>,
    #[serde(deserialize_with = "empty_object_as_none")]
    pub event: Option<Event>,
    pub created_at: Option<i64>,
    pub accepted_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub filled_at: Option<i64>,
    pub cancellation_requested_at: Option<i64>,
}

impl Order {
    /// Quantity still resting on the book.
    #[must_use]
    pub fn remaining_quantity(&self) -> i64 {
        self.quantity.unwrap_or(0).saturating_sub(self.filled_quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicAccount {
    pub id: Option<String>,
    pub tags: Value,
    pub display_name: Option<String>,
    pub created_at: Option<i64>,
}

/// Another participant's order, with the price withheld.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicOrder {
    pub id: String,
    pub account: PublicAccount,
    pub event_id: Option<String>,
    pub tradeable_id: Option<String>,
    pub entity_id: Option<String>,
    pub side: Option<String>,
    pub phase: Option<String>,
    pub created_at: Option<i64>,
}

impl PublicOrder {
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.account.id.as_deref()
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.account.display_name.as_deref()
    }
}

/// A matched trade printed to the event feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trade {
    pub id: String,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub tradeable_id: Option<String>,
    pub created_at: Option<i64>,
}
