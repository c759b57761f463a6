//! Streaming topics and the subscriptions built from them.
//!
//! Each topic fixes which arguments a subscription carries:
//!
//! | topic            | event_id | league   |
//! |------------------|----------|----------|
//! | `event_activity` | required | absent   |
//! | `event`          | required | absent   |
//! | `account`        | absent   | absent   |
//! | `notification`   | absent   | absent   |
//! | `games`          | absent   | required |
//!
//! [`Subscription`] can only be constructed in a shape that satisfies this
//! table, so everything downstream (registry, replay, frames) can trust it.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::league::League;
use crate::error::{Error, Result};

/// A named category of streaming updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    EventActivity,
    Event,
    Account,
    Notification,
    Games,
}

/// Argument a topic needs in addition to its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredArg {
    EventId,
    League,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::EventActivity,
        Topic::Event,
        Topic::Account,
        Topic::Notification,
        Topic::Games,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Topic::EventActivity => "event_activity",
            Topic::Event => "event",
            Topic::Account => "account",
            Topic::Notification => "notification",
            Topic::Games => "games",
        }
    }

    #[must_use]
    pub const fn required_arg(self) -> Option<RequiredArg> {
        match self {
            Topic::EventActivity | Topic::Event => Some(RequiredArg::EventId),
            Topic::Games => Some(RequiredArg::League),
            Topic::Account | Topic::Notification => None,
        }
    }

    /// Comma-separated list of valid topic names, used in error messages.
    #[must_use]
    pub fn valid_names() -> String {
        Topic::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Topic::ALL
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| Error::InvalidTopic {
                topic: s.to_string(),
                valid: Topic::valid_names(),
            })
    }
}

impl Serialize for Topic {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A validated `(topic, event_id, league)` triple.
///
/// Serializes to the `subscription` object of subscribe/unsubscribe frames;
/// absent arguments are sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Subscription {
    #[serde(rename = "type")]
    topic: Topic,
    event_id: Option<String>,
    league: Option<League>,
}

impl Subscription {
    /// Build a subscription, enforcing the per-topic argument table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSubscription`] when a required argument is
    /// missing, an unexpected one is present, or the league has no game feed.
    pub fn new(topic: Topic, event_id: Option<String>, league: Option<League>) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidSubscription {
            topic: topic.to_string(),
            reason: reason.to_string(),
        };

        match topic.required_arg() {
            Some(RequiredArg::EventId) => {
                if event_id.as_deref().map_or(true, str::is_empty) {
                    return Err(invalid("event_id is required"));
                }
                if league.is_some() {
                    return Err(invalid("league is not accepted"));
                }
            }
            Some(RequiredArg::League) => {
                let Some(league) = league else {
                    return Err(invalid("league is required"));
                };
                if !league.has_game_feed() {
                    return Err(invalid("league has no game feed"));
                }
                if event_id.is_some() {
                    return Err(invalid("event_id is not accepted"));
                }
            }
            None => {
                if event_id.is_some() || league.is_some() {
                    return Err(invalid("takes no arguments"));
                }
            }
        }

        Ok(Self {
            topic,
            event_id,
            league,
        })
    }

    /// Build a subscription from untyped arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTopic`] for an unlisted topic, otherwise the
    /// errors of [`Subscription::new`].
    pub fn parse(topic: &str, event_id: Option<&str>, league: Option<&str>) -> Result<Self> {
        let topic: Topic = topic.parse()?;
        let league = league
            .map(|name| {
                name.parse::<League>().map_err(|_| Error::InvalidSubscription {
                    topic: topic.to_string(),
                    reason: format!("unknown league '{name}'"),
                })
            })
            .transpose()?;
        Self::new(topic, event_id.map(str::to_string), league)
    }

    pub fn event(event_id: impl Into<String>) -> Result<Self> {
        Self::new(Topic::Event, Some(event_id.into()), None)
    }

    pub fn event_activity(event_id: impl Into<String>) -> Result<Self> {
        Self::new(Topic::EventActivity, Some(event_id.into()), None)
    }

    #[must_use]
    pub fn account() -> Self {
        Self {
            topic: Topic::Account,
            event_id: None,
            league: None,
        }
    }

    #[must_use]
    pub fn notification() -> Self {
        Self {
            topic: Topic::Notification,
            event_id: None,
            league: None,
        }
    }

    pub fn games(league: League) -> Result<Self> {
        Self::new(Topic::Games, None, Some(league))
    }

    #[must_use]
    pub const fn topic(&self) -> Topic {
        self.topic
    }

    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    #[must_use]
    pub const fn league(&self) -> Option<League> {
        self.league
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.topic)?;
        if let Some(event_id) = &self.event_id {
            write!(f, " event_id={event_id}")?;
        }
        if let Some(league) = self.league {
            write!(f, " league={league}")?;
        }
        Ok(())
    }
}

/// Parses the `topic[:argument]` shorthand, e.g. `games:nba` or `event:evt_123`.
impl FromStr for Subscription {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (topic_name, arg) = match s.split_once(':') {
            Some((topic, arg)) => (topic, Some(arg)),
            None => (s, None),
        };
        let topic: Topic = topic_name.parse()?;
        match topic.required_arg() {
            Some(RequiredArg::League) => Self::parse(topic_name, None, arg),
            _ => Self::parse(topic_name, arg, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_topic_round_trips_through_its_name() {
        for topic in Topic::ALL {
            assert_eq!(topic.as_str().parse::<Topic>().unwrap(), topic);
        }
    }

    #[test]
    fn unlisted_topic_lists_valid_ones() {
        let err = "orderbook".parse::<Topic>().unwrap_err();
        match err {
            Error::InvalidTopic { topic, valid } => {
                assert_eq!(topic, "orderbook");
                assert!(valid.contains("event_activity"));
                assert!(valid.contains("games"));
            }
            other => panic!("expected InvalidTopic, got {other:?}"),
        }
    }

    #[test]
    fn event_topics_require_an_event_id() {
        assert!(Subscription::new(Topic::Event, None, None).is_err());
        assert!(Subscription::new(Topic::EventActivity, Some(String::new()), None).is_err());
        assert!(Subscription::event("evt_1").is_ok());
    }

    #[test]
    fn games_requires_a_league_with_a_feed() {
        assert!(Subscription::new(Topic::Games, None, None).is_err());
        assert!(Subscription::games(League::SimulatedHorseRacing).is_err());
        assert!(Subscription::games(League::Nhl).is_ok());
    }

    #[test]
    fn argument_free_topics_reject_arguments() {
        assert!(Subscription::new(Topic::Account, Some("evt_1".into()), None).is_err());
        assert!(Subscription::new(Topic::Notification, None, Some(League::Nba)).is_err());
    }

    #[test]
    fn serializes_absent_arguments_as_null() {
        let value = serde_json::to_value(Subscription::account()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "account", "event_id": null, "league": null})
        );

        let value = serde_json::to_value(Subscription::games(League::Mlb).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "games", "event_id": null, "league": "mlb"})
        );
    }

    #[test]
    fn shorthand_places_argument_by_topic() {
        let sub: Subscription = "games:nfl".parse().unwrap();
        assert_eq!(sub.league(), Some(League::Nfl));
        assert_eq!(sub.event_id(), None);

        let sub: Subscription = "event_activity:evt_9".parse().unwrap();
        assert_eq!(sub.event_id(), Some("evt_9"));

        let sub: Subscription = "account".parse().unwrap();
        assert_eq!(sub, Subscription::account());
    }

    #[test]
    fn parse_reports_unknown_league_as_invalid_subscription() {
        let err = Subscription::parse("games", None, Some("cricket")).unwrap_err();
        assert!(matches!(err, Error::InvalidSubscription { .. }));
    }
}
