//! Fantasy scoring tables published by the exchange.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::league::League;

/// Points awarded per occurrence of a stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRule {
    pub stat: &'static str,
    pub points: Decimal,
}

const fn rule(stat: &'static str, points: Decimal) -> ScoringRule {
    ScoringRule { stat, points }
}

static NBA: [ScoringRule; 9] = [
    rule("point", dec!(1)),
    rule("10_pt_bonus", dec!(1.5)),
    rule("3pm", dec!(0.5)),
    rule("rebound", dec!(1.25)),
    rule("assist", dec!(1.5)),
    rule("steal", dec!(2)),
    rule("block", dec!(2)),
    rule("turnover", dec!(-0.5)),
    rule("missed_fg", dec!(-0.5)),
];

static NFL: [ScoringRule; 14] = [
    rule("pass_yards", dec!(0.04)),
    rule("pass_td", dec!(4)),
    rule("int_thrown", dec!(-3)),
    rule("rush_yards", dec!(0.1)),
    rule("rush_td", dec!(6)),
    rule("reception", dec!(1)),
    rule("receiving_yards", dec!(0.1)),
    rule("receiving_td", dec!(6)),
    rule("return_td", dec!(6)),
    rule("two_pt_conversion", dec!(2)),
    rule("fumble_lost", dec!(-3)),
    rule("100_yd_passing_bonus", dec!(1)),
    rule("100_yd_rushing_bonus", dec!(3)),
    rule("100_yd_receiving_bonus", dec!(3)),
];

static NHL: [ScoringRule; 17] = [
    rule("goal", dec!(8.5)),
    rule("assist", dec!(5)),
    rule("shot_on_goal", dec!(1.5)),
    rule("blocked_shot", dec!(2)),
    rule("shorthanded_pt", dec!(2)),
    rule("shootout_goal", dec!(1.5)),
    rule("hat_trick", dec!(3)),
    rule("3_plus_blocks", dec!(3)),
    rule("3_plus_pts", dec!(3)),
    rule("penalty_mins", dec!(-0.5)),
    rule("hits", dec!(1)),
    rule("goalie_win", dec!(6)),
    rule("goalie_save", dec!(0.5)),
    rule("goal_allowed", dec!(-3.5)),
    rule("ot_loss", dec!(2)),
    rule("35_plus_saves", dec!(3)),
    rule("shutout", dec!(4)),
];

static PGA: [ScoringRule; 10] = [
    rule("win", dec!(5)),
    rule("albatross", dec!(4)),
    rule("eagle", dec!(3)),
    rule("birdie", dec!(2)),
    rule("par", dec!(1)),
    rule("bogey", dec!(0)),
    rule("double_bogey", dec!(-1)),
    rule("triple_bogey", dec!(-2)),
    rule("quadruple_bogey", dec!(-3)),
    rule("quintuple_bogey", dec!(-4)),
];

static MLB: [ScoringRule; 10] = [
    rule("at_bat", dec!(0.5)),
    rule("single", dec!(2.5)),
    rule("double", dec!(3)),
    rule("triple", dec!(3.5)),
    rule("home_run", dec!(4)),
    rule("walk", dec!(2)),
    rule("run", dec!(2)),
    rule("rbi", dec!(2)),
    rule("stolen_base", dec!(3)),
    rule("strikeout", dec!(-1)),
];

static NASCAR: [ScoringRule; 4] = [
    rule("lap_complete", dec!(1)),
    rule("position", dec!(-1)),
    rule("win", dec!(10)),
    rule("start_bonus", dec!(40)),
];

impl League {
    /// Scoring table for the league; empty for simulations.
    #[must_use]
    pub fn scoring(self) -> &'static [ScoringRule] {
        match self {
            League::Nba => &NBA,
            League::Nfl => &NFL,
            League::Nhl => &NHL,
            League::Pga => &PGA,
            League::Mlb => &MLB,
            League::Nascar => &NASCAR,
            League::SimulatedHorseRacing => &[],
        }
    }

    /// Points for one stat, if the league scores it.
    #[must_use]
    pub fn points_for(self, stat: &str) -> Option<Decimal> {
        self.scoring()
            .iter()
            .find(|rule| rule.stat == stat)
            .map(|rule| rule.points)
    }

    /// Fantasy points for a stat line. Stats the league does not score are ignored.
    pub fn fantasy_points<'a>(self, line: impl IntoIterator<Item = (&'a str, Decimal)>) -> Decimal {
        line.into_iter()
            .filter_map(|(stat, count)| self.points_for(stat).map(|points| points * count))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_real_league_has_a_table() {
        for league in League::ALL {
            let expected_empty = league == League::SimulatedHorseRacing;
            assert_eq!(league.scoring().is_empty(), expected_empty, "{league}");
        }
    }

    #[test]
    fn looks_up_single_stat() {
        assert_eq!(League::Nhl.points_for("goal"), Some(dec!(8.5)));
        assert_eq!(League::Nhl.points_for("touchdown"), None);
    }

    #[test]
    fn scores_a_stat_line() {
        let line = [("point", dec!(30)), ("rebound", dec!(8)), ("turnover", dec!(4)), ("dunk", dec!(3))];
        // 30 + 10 - 2
        assert_eq!(League::Nba.fantasy_points(line), dec!(38));
    }
}
