//! Sports data models
//!
//! This module contains the core data types for resolution:
//! - `types` - Type aliases for common identifiers (ProviderId, EntityId, Season)
//! - `operation` - Typed logical requests (Operation) and poll selection (PollType)
//! - `value` - The tagged domain value a resolution produces (DataValue)
//! - `teams`, `games`, `rankings`, `stats`, `common` - Domain records

mod common;
mod games;
mod operation;
mod rankings;
mod stats;
mod teams;
mod types;
mod value;

pub use common::{Record, Venue};
pub use games::{
    BoxScore, Game, GameStatus, Play, PlayByPlay, PlayerBoxScore, TeamBoxScore, TeamScore,
};
pub use operation::{Operation, PollType};
pub use rankings::{ConferenceStandings, Poll, RankedTeam, StandingsEntry, Trend};
pub use stats::{PlayerStats, StatLeader, TeamStats};
pub use teams::{Player, Team};
pub use types::{EntityId, ProviderId, Season};
pub use value::DataValue;
