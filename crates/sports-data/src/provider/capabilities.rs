//! Provider capabilities and rate limiting configuration.
//!
//! This module defines what a sports data provider can answer and how
//! hard it may be called.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Category of data an operation needs.
///
/// A provider is only asked for a request when its capability set contains
/// the request's capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    LiveScores,
    TeamInfo,
    TeamSearch,
    Roster,
    Schedule,
    GameDetail,
    BoxScore,
    PlayByPlay,
    Rankings,
    Standings,
    TeamStats,
    PlayerStats,
    StatLeaders,
}

impl Capability {
    pub const ALL: [Capability; 13] = [
        Self::LiveScores,
        Self::TeamInfo,
        Self::TeamSearch,
        Self::Roster,
        Self::Schedule,
        Self::GameDetail,
        Self::BoxScore,
        Self::PlayByPlay,
        Self::Rankings,
        Self::Standings,
        Self::TeamStats,
        Self::PlayerStats,
        Self::StatLeaders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LiveScores => "LIVE_SCORES",
            Self::TeamInfo => "TEAM_INFO",
            Self::TeamSearch => "TEAM_SEARCH",
            Self::Roster => "ROSTER",
            Self::Schedule => "SCHEDULE",
            Self::GameDetail => "GAME_DETAIL",
            Self::BoxScore => "BOX_SCORE",
            Self::PlayByPlay => "PLAY_BY_PLAY",
            Self::Rankings => "RANKINGS",
            Self::Standings => "STANDINGS",
            Self::TeamStats => "TEAM_STATS",
            Self::PlayerStats => "PLAYER_STATS",
            Self::StatLeaders => "STAT_LEADERS",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rate limiting configuration for a provider.
///
/// Controls how aggressively we can call a provider to avoid
/// hitting their limits and getting blocked.
#[derive(Clone, Debug, PartialEq)]
pub struct RateLimit {
    /// Sustained requests allowed per second.
    pub requests_per_second: f64,

    /// Maximum burst. `None` means twice the sustained rate.
    pub burst_capacity: Option<u32>,
}

impl RateLimit {
    pub fn per_second(requests_per_second: f64) -> Self {
        Self {
            requests_per_second,
            burst_capacity: None,
        }
    }

    pub fn with_burst(mut self, burst_capacity: u32) -> Self {
        self.burst_capacity = Some(burst_capacity);
        self
    }

    /// Time to refill one token, or `None` when the rate is not positive and
    /// finite or one token would take longer than a `Duration` can hold.
    pub fn refill_interval(&self) -> Option<Duration> {
        let rate = self.requests_per_second;
        if !rate.is_finite() || rate <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(1.0 / rate).ok()
    }

    pub fn is_valid(&self) -> bool {
        self.refill_interval().is_some()
    }

    /// Effective bucket capacity, never below one token.
    pub fn capacity(&self) -> f64 {
        let capacity = match self.burst_capacity {
            Some(burst) => burst as f64,
            None => (self.requests_per_second * 2.0).floor(),
        };
        capacity.max(1.0)
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::per_second(5.0)
    }
}
