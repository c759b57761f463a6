//! Exchange domain types: topics, frames and the records decoded from the stream.

mod account;
mod de;
mod entity;
mod envelope;
mod frame;
mod league;
mod market;
mod order;
mod scoring;
mod topic;

pub use account::{Balance, Position};
pub use entity::{
    BaseballPlayer, Driver, Entity, EntityProfile, Golfer, HockeyPlayer, Injury, Team, TeamAthlete,
};
pub use envelope::{decode, decode_entity, Envelope, MessageTag, Record};
pub(crate) use envelope::decode_as;
pub use frame::{Authentication, ClientFrame};
pub use league::League;
pub use market::{Entry, Event, Game, Leaderboard, Points, Prices, Ranks, Tradeable};
pub use order::{Order, Phase, PublicAccount, PublicOrder, Side, Trade};
pub use scoring::ScoringRule;
pub use topic::{RequiredArg, Subscription, Topic};
