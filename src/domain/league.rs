//! Leagues listed on the exchange.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A sports league (or simulation) that entities and events belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum League {
    Nba,
    Nfl,
    Nhl,
    Pga,
    Mlb,
    Nascar,
    SimulatedHorseRacing,
}

impl League {
    /// Every league the decoder recognises.
    pub const ALL: [League; 7] = [
        League::Nba,
        League::Nfl,
        League::Nhl,
        League::Pga,
        League::Mlb,
        League::Nascar,
        League::SimulatedHorseRacing,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            League::Nba => "nba",
            League::Nfl => "nfl",
            League::Nhl => "nhl",
            League::Pga => "pga",
            League::Mlb => "mlb",
            League::Nascar => "nascar",
            League::SimulatedHorseRacing => "simulated_horse_racing",
        }
    }

    /// Whether the `games` topic accepts this league.
    ///
    /// Horse-racing simulations have no game feed.
    #[must_use]
    pub const fn has_game_feed(self) -> bool {
        !matches!(self, League::SimulatedHorseRacing)
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for League {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        League::ALL
            .into_iter()
            .find(|league| league.as_str() == s)
            .ok_or_else(|| Error::UnknownLeague(s.to_string()))
    }
}
