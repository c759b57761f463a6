//! Inbound frames and their decoding into typed records.
//!
//! Every frame the server pushes has the shape `{"object": <tag>, <tag>: {...}}`.
//! [`Envelope::from_frame`] reads the tag, picks the decoder for it and keeps
//! the remaining top-level fields (such as `status`) alongside the record.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::account::{Balance, Position};
use super::entity::Entity;
use super::league::League;
use super::market::{Entry, Event, Game, Tradeable};
use super::order::{Order, PublicOrder, Trade};
use crate::error::{Error, Result};

/// Type tag read from a frame's `object` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTag {
    Error,
    Balance,
    Order,
    Subscription,
    Tradeable,
    Game,
    Event,
    Entry,
    Position,
    Trade,
    Notification,
}

impl MessageTag {
    pub const ALL: [MessageTag; 11] = [
        MessageTag::Error,
        MessageTag::Balance,
        MessageTag::Order,
        MessageTag::Subscription,
        MessageTag::Tradeable,
        MessageTag::Game,
        MessageTag::Event,
        MessageTag::Entry,
        MessageTag::Position,
        MessageTag::Trade,
        MessageTag::Notification,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageTag::Error => "error",
            MessageTag::Balance => "balance",
            MessageTag::Order => "order",
            MessageTag::Subscription => "subscription",
            MessageTag::Tradeable => "tradeable",
            MessageTag::Game => "game",
            MessageTag::Event => "event",
            MessageTag::Entry => "entry",
            MessageTag::Position => "position",
            MessageTag::Trade => "trade",
            MessageTag::Notification => "notification",
        }
    }
}

impl fmt::Display for MessageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MessageTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| Error::UnknownMessageType(s.to_string()))
    }
}

/// A decoded payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Balance(Balance),
    Order(Box<Order>),
    PublicOrder(PublicOrder),
    /// Subscribe/unsubscribe acknowledgment, kept as the untouched frame.
    Subscription(Value),
    Tradeable(Box<Tradeable>),
    Game(Game),
    Event(Box<Event>),
    Entry(Entry),
    Position(Position),
    Trade(Trade),
    /// Notification schemas vary freely, so they stay untyped.
    Notification(Map<String, Value>),
}

/// One decoded inbound frame.
///
/// Serializes back to the wire shape with the decoded record in place of the
/// raw payload, so consumers still see the tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    tag: MessageTag,
    record: Record,
    fields: Map<String, Value>,
}

impl Envelope {
    /// Decode a parsed frame.
    ///
    /// # Errors
    ///
    /// - [`Error::Stream`] for `error` frames, carrying the whole frame
    /// - [`Error::UnknownMessageType`] for a missing or unlisted `object`
    /// - [`Error::UnknownLeague`] when a nested entity names an unlisted league
    /// - [`Error::Decode`] when a field has the wrong JSON type
    pub fn from_frame(frame: Value) -> Result<Self> {
        let tag = match frame.get("object") {
            Some(Value::String(tag)) => tag.parse::<MessageTag>()?,
            Some(other) => return Err(Error::UnknownMessageType(other.to_string())),
            None => return Err(Error::UnknownMessageType(String::new())),
        };

        match tag {
            MessageTag::Error => return Err(Error::Stream(frame)),
            MessageTag::Subscription => {
                return Ok(Self {
                    tag,
                    record: Record::Subscription(frame),
                    fields: Map::new(),
                });
            }
            _ => {}
        }

        let Value::Object(mut fields) = frame else {
            return Err(Error::UnknownMessageType(String::new()));
        };
        let payload = fields
            .remove(tag.as_str())
            .unwrap_or_else(|| Value::Object(Map::new()));
        fields.remove("object");

        let record = decode(tag, payload)?;
        Ok(Self {
            tag,
            record,
            fields,
        })
    }

    /// Parse and decode a raw text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for text that is not JSON, otherwise the errors
    /// of [`Envelope::from_frame`].
    pub fn from_text(raw: &str) -> Result<Self> {
        Self::from_frame(serde_json::from_str(raw)?)
    }

    #[must_use]
    pub const fn tag(&self) -> MessageTag {
        self.tag
    }

    #[must_use]
    pub const fn record(&self) -> &Record {
        &self.record
    }

    #[must_use]
    pub fn into_record(self) -> Record {
        self.record
    }

    /// Top-level frame fields other than `object` and the payload.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if let Record::Subscription(frame) = &self.record {
            return frame.serialize(serializer);
        }
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        map.serialize_entry("object", self.tag.as_str())?;
        map.serialize_entry(self.tag.as_str(), &self.record)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Decode a payload for a known tag.
///
/// Orders are split by field presence: the account's own orders carry
/// `limit_price`, other participants' orders do not.
///
/// # Errors
///
/// Returns [`Error::Stream`] for the `error` tag, [`Error::UnknownLeague`] for an
/// entity in an unlisted league and [`Error::Decode`] for mistyped fields.
pub fn decode(tag: MessageTag, payload: Value) -> Result<Record> {
    let record = match tag {
        MessageTag::Error => return Err(Error::Stream(payload)),
        MessageTag::Subscription => Record::Subscription(payload),
        MessageTag::Balance => Record::Balance(typed(tag, payload)?),
        MessageTag::Order if payload.get("limit_price").is_some() => {
            Record::Order(Box::new(typed(tag, payload)?))
        }
        MessageTag::Order => Record::PublicOrder(typed(tag, payload)?),
        MessageTag::Tradeable => Record::Tradeable(Box::new(typed(tag, payload)?)),
        MessageTag::Game => Record::Game(typed(tag, payload)?),
        MessageTag::Event => Record::Event(Box::new(typed(tag, payload)?)),
        MessageTag::Entry => Record::Entry(typed(tag, payload)?),
        MessageTag::Position => Record::Position(typed(tag, payload)?),
        MessageTag::Trade => Record::Trade(typed(tag, payload)?),
        MessageTag::Notification => match payload {
            Value::Object(map) => Record::Notification(map),
            Value::Null => Record::Notification(Map::new()),
            other => {
                return Err(Error::Decode {
                    tag: tag.to_string(),
                    reason: format!("expected an object, got {other}"),
                })
            }
        },
    };
    Ok(record)
}

/// Decode a standalone entity payload by its `league` field.
///
/// # Errors
///
/// Returns [`Error::UnknownLeague`] for a missing or unlisted league.
pub fn decode_entity(payload: Value) -> Result<Entity> {
    let league = league_of(&payload)?;
    ensure_known_leagues(&payload)?;
    serde_json::from_value(payload).map_err(|err| Error::Decode {
        tag: format!("entity/{league}"),
        reason: err.to_string(),
    })
}

fn typed<T: DeserializeOwned>(tag: MessageTag, payload: Value) -> Result<T> {
    decode_as(tag.as_str(), payload)
}

/// Decode any record type, running the league check first.
///
/// `label` names the payload in `Error::Decode`.
pub(crate) fn decode_as<T: DeserializeOwned>(label: &str, payload: Value) -> Result<T> {
    ensure_known_leagues(&payload)?;
    serde_json::from_value(payload).map_err(|err| Error::Decode {
        tag: label.to_string(),
        reason: err.to_string(),
    })
}

fn league_of(entity: &Value) -> Result<League> {
    match entity.get("league") {
        Some(Value::String(name)) => name.parse(),
        Some(other) => Err(Error::UnknownLeague(other.to_string())),
        None => Err(Error::UnknownLeague(String::new())),
    }
}

/// Check every non-empty nested `entity` object names a listed league.
fn ensure_known_leagues(value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "entity" {
                    if let Value::Object(entity) = child {
                        if !entity.is_empty() {
                            league_of(child)?;
                        }
                    }
                }
                ensure_known_leagues(child)?;
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(ensure_known_leagues),
        _ => Ok(()),
    }
}
