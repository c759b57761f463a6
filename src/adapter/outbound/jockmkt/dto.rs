//! Request and response bodies of the Jock MKT REST API.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::{Phase, Side};
use crate::error::{Error, Result};

/// Highest limit price the exchange accepts.
pub const MAX_LIMIT_PRICE: Decimal = dec!(25);

/// Body of `POST /oauth/tokens`.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub token: Option<TokenBody>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenBody {
    pub access_token: String,
    /// Expiry as epoch milliseconds.
    pub expired_at: i64,
}

/// Error body sent with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// How many shares an order asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderQuantity {
    Shares(u32),
    /// Spend at most this much; the share count is rounded down.
    Budget(Decimal),
}

/// A limit order to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub tradeable_id: String,
    pub price: Decimal,
    pub quantity: OrderQuantity,
    pub side: Side,
    pub phase: Phase,
}

impl OrderRequest {
    /// One share, buy side, IPO phase.
    pub fn new(tradeable_id: impl Into<String>, price: Decimal) -> Self {
        Self {
            tradeable_id: tradeable_id.into(),
            price,
            quantity: OrderQuantity::Shares(1),
            side: Side::Buy,
            phase: Phase::Ipo,
        }
    }

    #[must_use]
    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    #[must_use]
    pub fn phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    #[must_use]
    pub fn shares(mut self, shares: u32) -> Self {
        self.quantity = OrderQuantity::Shares(shares);
        self
    }

    #[must_use]
    pub fn budget(mut self, budget: Decimal) -> Self {
        self.quantity = OrderQuantity::Budget(budget);
        self
    }

    /// Build the form the exchange expects.
    ///
    /// The price is capped at [`MAX_LIMIT_PRICE`] and truncated to cents; a
    /// budget is divided by the capped price and rounded down.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] for a non-positive price or a quantity
    /// of zero.
    pub fn to_form(&self) -> Result<OrderForm> {
        if self.price <= Decimal::ZERO {
            return Err(Error::InvalidOrder(format!(
                "limit price must be positive, got {}",
                self.price
            )));
        }
        let capped = self.price.min(MAX_LIMIT_PRICE);
        let quantity = match self.quantity {
            OrderQuantity::Shares(shares) => Decimal::from(shares),
            OrderQuantity::Budget(budget) => (budget / capped).floor(),
        };
        if quantity <= Decimal::ZERO {
            return Err(Error::InvalidOrder(format!(
                "quantity rounds to zero at price {capped}"
            )));
        }
        let limit = capped.round_dp_with_strategy(2, RoundingStrategy::ToZero);

        Ok(OrderForm {
            tradeable_id: self.tradeable_id.clone(),
            side: self.side,
            order_type: "limit",
            phase: self.phase,
            quantity: quantity.normalize().to_string(),
            limit_price: format!("{limit:.2}"),
        })
    }
}

/// Form body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderForm {
    pub tradeable_id: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: &'static str,
    pub phase: Phase,
    pub quantity: String,
    pub limit_price: String,
}
