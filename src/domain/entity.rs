//! League-specific participant records.
//!
//! An entity is a player, golfer or driver. Its `league` field selects the
//! shape of the rest of the payload; [`Entity`] is decoded by that tag.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::de::string_or_number;
use super::league::League;

/// Fields every entity carries regardless of league.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityProfile {
    pub id: String,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    pub updated_at: Option<i64>,
    pub news: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Injury {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    pub id: String,
    pub location: Option<String>,
    pub name: Option<String>,
    pub league: Option<String>,
    pub abbreviation: Option<String>,
}

/// Basketball and football players share one shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamAthlete {
    #[serde(flatten)]
    pub profile: EntityProfile,
    #[serde(alias = "current_team_id")]
    pub team_id: Option<String>,
    pub team: Option<Team>,
    pub preferred_name: Option<String>,
    pub position: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    #[serde(deserialize_with = "string_or_number")]
    pub jersey_number: Option<String>,
    pub college: Option<String>,
    pub birthdate: Option<String>,
    pub rookie_year: Option<i32>,
    pub status: Option<String>,
    pub injury: Option<Injury>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HockeyPlayer {
    #[serde(flatten)]
    pub profile: EntityProfile,
    #[serde(alias = "current_team_id")]
    pub team_id: Option<String>,
    pub team: Option<Team>,
    pub preferred_name: Option<String>,
    pub position: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    #[serde(deserialize_with = "string_or_number")]
    pub jersey_number: Option<String>,
    pub handedness: Option<String>,
    pub rookie_year: Option<i32>,
    pub status: Option<String>,
    pub injury: Option<Injury>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Golfer {
    #[serde(flatten)]
    pub profile: EntityProfile,
    pub preferred_name: Option<String>,
    pub birthdate: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub college: Option<String>,
    pub turned_pro: Option<i32>,
    pub country: Option<String>,
    pub injury: Option<Injury>,
}

impl Golfer {
    /// The `YYYY-MM-DD` part of the birthdate; the feed appends a time component.
    #[must_use]
    pub fn birth_date(&self) -> Option<&str> {
        self.birthdate.as_deref().map(|d| d.get(..10).unwrap_or(d))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseballPlayer {
    #[serde(flatten)]
    pub profile: EntityProfile,
    #[serde(alias = "current_team_id")]
    pub team_id: Option<String>,
    pub team: Option<Team>,
    pub preferred_name: Option<String>,
    pub position: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub jersey_number: Option<String>,
    pub college: Option<String>,
    pub debut: Option<String>,
    pub birthdate: Option<String>,
    pub status: Option<String>,
    pub injury: Option<Injury>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Driver {
    #[serde(flatten)]
    pub profile: EntityProfile,
    #[serde(alias = "current_team_id")]
    pub team_id: Option<String>,
    pub team: Option<Team>,
    pub points_eligible: Option<bool>,
    pub in_chase: Option<bool>,
    pub cars: Vec<Value>,
    pub birthday: Option<String>,
    pub birth_place: Option<String>,
    pub rookie_year: Option<i32>,
    pub status: Option<String>,
    pub injury: Option<Injury>,
}

/// An entity, discriminated by its `league` field.
///
/// Payloads with a league outside [`League::ALL`] are rejected by the
/// decoder before they reach serde, so a missing variant surfaces as
/// `Error::UnknownLeague` rather than a generic decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "league", rename_all = "snake_case")]
pub enum Entity {
    Nba(TeamAthlete),
    Nfl(TeamAthlete),
    Nhl(HockeyPlayer),
    Pga(Golfer),
    Mlb(BaseballPlayer),
    Nascar(Driver),
    SimulatedHorseRacing(EntityProfile),
}

impl Entity {
    #[must_use]
    pub const fn league(&self) -> League {
        match self {
            Entity::Nba(_) => League::Nba,
            Entity::Nfl(_) => League::Nfl,
            Entity::Nhl(_) => League::Nhl,
            Entity::Pga(_) => League::Pga,
            Entity::Mlb(_) => League::Mlb,
            Entity::Nascar(_) => League::Nascar,
            Entity::SimulatedHorseRacing(_) => League::SimulatedHorseRacing,
        }
    }

    #[must_use]
    pub const fn profile(&self) -> &EntityProfile {
        match self {
            Entity::Nba(e) | Entity::Nfl(e) => &e.profile,
            Entity::Nhl(e) => &e.profile,
            Entity::Pga(e) => &e.profile,
            Entity::Mlb(e) => &e.profile,
            Entity::Nascar(e) => &e.profile,
            Entity::SimulatedHorseRacing(profile) => profile,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.profile().id
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.profile().name.as_deref()
    }

    #[must_use]
    pub fn injury(&self) -> Option<&Injury> {
        match self {
            Entity::Nba(e) | Entity::Nfl(e) => e.injury.as_ref(),
            Entity::Nhl(e) => e.injury.as_ref(),
            Entity::Pga(e) => e.injury.as_ref(),
            Entity::Mlb(e) => e.injury.as_ref(),
            Entity::Nascar(e) => e.injury.as_ref(),
            Entity::SimulatedHorseRacing(_) => None,
        }
    }

    #[must_use]
    pub fn team(&self) -> Option<&Team> {
        match self {
            Entity::Nba(e) | Entity::Nfl(e) => e.team.as_ref(),
            Entity::Nhl(e) => e.team.as_ref(),
            Entity::Mlb(e) => e.team.as_ref(),
            Entity::Nascar(e) => e.team.as_ref(),
            Entity::Pga(_) | Entity::SimulatedHorseRacing(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nba_entity_reads_team_and_injury() {
        let entity: Entity = serde_json::from_value(json!({
            "id": "en_1",
            "league": "nba",
            "name": "Jane Doe",
            "current_team_id": "tm_1",
            "team": {"id": "tm_1", "location": "Boston", "name": "Celtics", "abbreviation": "BOS"},
            "jersey_number": 7,
            "injury": {"status": "out", "type": "ankle"}
        }))
        .unwrap();

        assert_eq!(entity.league(), League::Nba);
        assert_eq!(entity.id(), "en_1");
        assert_eq!(entity.name(), Some("Jane Doe"));
        assert_eq!(entity.team().and_then(|t| t.abbreviation.as_deref()), Some("BOS"));
        let injury = entity.injury().unwrap();
        assert_eq!(injury.status.as_deref(), Some("out"));
        assert_eq!(injury.kind.as_deref(), Some("ankle"));
        match entity {
            Entity::Nba(player) => {
                assert_eq!(player.team_id.as_deref(), Some("tm_1"));
                assert_eq!(player.jersey_number.as_deref(), Some("7"));
            }
            other => panic!("expected nba entity, got {other:?}"),
        }
    }

    #[test]
    fn missing_optional_fields_default() {
        let entity: Entity = serde_json::from_value(json!({"league": "nascar"})).unwrap();
        match entity {
            Entity::Nascar(driver) => {
                assert!(driver.profile.id.is_empty());
                assert!(driver.cars.is_empty());
                assert!(driver.injury.is_none());
            }
            other => panic!("expected nascar entity, got {other:?}"),
        }
    }

    #[test]
    fn golfer_birth_date_drops_time() {
        let entity: Entity = serde_json::from_value(json!({
            "id": "en_2",
            "league": "pga",
            "birthdate": "1990-04-01T00:00:00Z"
        }))
        .unwrap();
        let Entity::Pga(golfer) = entity else {
            panic!("expected golfer");
        };
        assert_eq!(golfer.birth_date(), Some("1990-04-01"));
    }

    #[test]
    fn serializes_league_tag_back() {
        let entity = Entity::SimulatedHorseRacing(EntityProfile {
            id: "en_3".into(),
            ..EntityProfile::default()
        });
        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["league"], "simulated_horse_racing");
        assert_eq!(value["id"], "en_3");
    }
}
