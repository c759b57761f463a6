//! Account-level records: balances and positions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Funds held in one currency.
///
/// Contest currencies are scoped to a single event; their code carries the
/// event id after a four-character prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Balance {
    pub currency: String,
    #[serde(rename = "type")]
    pub currency_type: Option<String>,
    pub total: Option<Decimal>,
    pub buying_power: Option<Decimal>,
    pub pending: Option<Decimal>,
}

impl Balance {
    /// Event a contest balance belongs to, e.g. `ctk_abc` yields `evt_abc`.
    #[must_use]
    pub fn event_id(&self) -> Option<String> {
        if self.currency_type.as_deref() != Some("contest") {
            return None;
        }
        self.currency
            .get(4..)
            .filter(|suffix| !suffix.is_empty())
            .map(|suffix| format!("evt_{suffix}"))
    }
}

/// The account's holding in one tradeable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub tradeable_id: String,
    pub event_id: Option<String>,
    pub bought_count: i64,
    pub sold_count: i64,
    pub buy_interest: i64,
    pub sell_interest: i64,
    pub quantity: i64,
    pub cost_basis: Decimal,
    pub proceeds: Decimal,
    pub cost_basis_all_time: Decimal,
    pub proceeds_all_time: Decimal,
    pub updated_at: Option<i64>,
}

impl Position {
    /// Realized result over the position's lifetime.
    #[must_use]
    pub fn realized_all_time(&self) -> Decimal {
        self.proceeds_all_time - self.cost_basis_all_time
    }
}
