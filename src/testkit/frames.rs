//! Builders for inbound frames as the server sends them.

use serde_json::{json, Value};

pub fn balance(currency: &str, buying_power: i64) -> Value {
    json!({
        "object": "balance",
        "balance": {"currency": currency, "type": "cash", "buying_power": buying_power}
    })
}

pub fn subscription_ack(topic: &str) -> Value {
    json!({
        "object": "subscription",
        "status": "success",
        "subscription": {"type": topic, "event_id": null, "league": null}
    })
}

/// The account's own order; carries `limit_price`.
pub fn own_order(id: &str) -> Value {
    json!({
        "object": "order",
        "order": {
            "id": id,
            "tradeable_id": "tdbl_1",
            "side": "buy",
            "phase": "live",
            "status": "created",
            "quantity": 2,
            "limit_price": "4.50"
        }
    })
}

/// Another participant's order; no `limit_price`.
pub fn public_order(id: &str) -> Value {
    json!({
        "object": "order",
        "order": {
            "id": id,
            "tradeable_id": "tdbl_1",
            "side": "sell",
            "quantity": 1,
            "account": {"id": "acct_9", "display_name": "someone"}
        }
    })
}

pub fn error(message: &str) -> Value {
    json!({"object": "error", "error": {"message": message}})
}

pub fn unknown(tag: &str) -> Value {
    json!({"object": tag, tag: {}})
}

pub fn notification(title: &str) -> Value {
    json!({"object": "notification", "notification": {"title": title}})
}
