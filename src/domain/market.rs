//! Events, games and the tradeables listed in them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de::empty_object_as_none;
use super::entity::Entity;

/// A real-world game feeding scores into one or more events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Game {
    pub id: String,
    pub name: Option<String>,
    pub league: Option<String>,
    pub scheduled_start: Option<i64>,
    pub venue: Option<Value>,
    pub status: Option<String>,
    pub amount_completed: Option<Decimal>,
    pub state: Option<Value>,
    pub weather: Option<Value>,
    pub home: Map<String, Value>,
    pub away: Map<String, Value>,
}

/// A contest on the exchange with its own tradeables and payout table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub status: Option<String>,
    pub league: Option<String>,
    pub ipo_open_at: Option<i64>,
    pub live_at_estimated: Option<i64>,
    pub close_at_estimated: Option<i64>,
    pub amount_completed: Option<Decimal>,
    pub updated_at: Option<i64>,
    pub payouts: Vec<Value>,
    pub current_shares: Option<i64>,
    pub games: Vec<Game>,
    pub tradeables: Vec<Tradeable>,
    pub contest: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Points {
    pub projected: Option<Decimal>,
    pub projected_live: Option<Decimal>,
    pub scored: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prices {
    pub ipo: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub last: Option<Decimal>,
    pub estimated: Option<Decimal>,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    #[serde(rename = "final")]
    pub final_price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ranks {
    pub projected: Option<u32>,
    pub projected_live: Option<u32>,
    pub scored: Option<u32>,
    pub price: Option<u32>,
    #[serde(rename = "final")]
    pub final_rank: Option<u32>,
}

/// An event-specific, priced instance of an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tradeable {
    pub id: String,
    pub updated_at: Option<i64>,
    pub league: Option<String>,
    pub entity_id: Option<String>,
    pub event_id: Option<String>,
    pub focus_game_id: Option<String>,
    pub next_game_id: Option<String>,
    pub projected_games_remaining: Option<i64>,
    pub projected_games_total: Option<i64>,
    pub points: Points,
    #[serde(rename = "price")]
    pub prices: Prices,
    #[serde(rename = "rank")]
    pub ranks: Ranks,
    pub stats: Value,
    #[serde(deserialize_with = "empty_object_as_none")]
    pub entity: Option<Entity>,
}

impl Tradeable {
    /// IPO price, which the exchange fixes at 1 unless stated otherwise.
    #[must_use]
    pub fn ipo_price(&self) -> Decimal {
        self.prices.ipo.unwrap_or(Decimal::ONE)
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.entity.as_ref().and_then(Entity::name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Leaderboard {
    pub position: Option<u32>,
    pub amount: Option<Decimal>,
}

/// The account's participation in an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    pub id: String,
    pub event_id: Option<String>,
    pub leaderboard: Leaderboard,
    pub updated_at: Option<i64>,
    pub favorites: Vec<String>,
    #[serde(deserialize_with = "empty_object_as_none")]
    pub event: Option<Event>,
    pub payouts: Option<Value>,
}
