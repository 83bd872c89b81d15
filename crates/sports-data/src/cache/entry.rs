use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DataValue, ProviderId};

/// Layout version written into every persisted entry.
pub const ENTRY_VERSION: u32 = 1;

/// Volatility class of cached data. Each class maps to a TTL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtlClass {
    /// Scoreboards while games are on.
    Live,
    /// Game detail and box scores.
    InGame,
    PlayByPlay,
    /// Rankings, standings, schedules and stats.
    Hourly,
    /// Team info and rosters.
    Daily,
}

impl TtlClass {
    pub const ALL: [TtlClass; 5] = [
        Self::Live,
        Self::InGame,
        Self::PlayByPlay,
        Self::Hourly,
        Self::Daily,
    ];

    pub fn default_ttl(&self) -> Duration {
        match self {
            Self::Live => Duration::from_secs(30),
            Self::InGame => Duration::from_secs(60),
            Self::PlayByPlay => Duration::from_secs(120),
            Self::Hourly => Duration::from_secs(3_600),
            Self::Daily => Duration::from_secs(86_400),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::InGame => "in_game",
            Self::PlayByPlay => "play_by_play",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
        }
    }
}

/// TTLs are kept in whole seconds; a fractional TTL rounds up so it never
/// collapses to zero.
fn whole_secs(ttl: Duration) -> u64 {
    ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0))
}

/// TTL per class, with overrides on top of the defaults. Overrides are
/// rounded up to whole seconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TtlPolicy {
    overrides: HashMap<TtlClass, Duration>,
}

impl TtlPolicy {
    pub fn with_ttl(mut self, class: TtlClass, ttl: Duration) -> Self {
        self.set(class, ttl);
        self
    }

    pub fn set(&mut self, class: TtlClass, ttl: Duration) {
        self.overrides.insert(class, Duration::from_secs(whole_secs(ttl)));
    }

    pub fn ttl(&self, class: TtlClass) -> Duration {
        self.overrides
            .get(&class)
            .copied()
            .unwrap_or_else(|| class.default_ttl())
    }
}

fn current_version() -> u32 {
    ENTRY_VERSION
}

/// A cached value with its provenance and expiry data.
///
/// This is also the on-disk envelope. Unknown fields are ignored and missing
/// ones take defaults, so adding a field never invalidates older files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(default = "current_version")]
    pub version: u32,
    pub payload: DataValue,
    /// Provider that produced the payload.
    #[serde(default)]
    pub provider: ProviderId,
    pub created_at: DateTime<Utc>,
    pub ttl_class: TtlClass,
    /// TTL in effect when the entry was written, in whole seconds.
    pub ttl_secs: u64,
}

impl CacheEntry {
    pub fn new(
        payload: DataValue,
        provider: ProviderId,
        created_at: DateTime<Utc>,
        ttl_class: TtlClass,
        ttl: Duration,
    ) -> Self {
        Self {
            version: ENTRY_VERSION,
            payload,
            provider,
            created_at,
            ttl_class,
            ttl_secs: whole_secs(ttl),
        }
    }

    /// Time since the entry was written. Negative if the clock went backwards.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.created_at)
    }

    /// An entry is stale once its age exceeds its TTL; at exactly the TTL it
    /// is still served.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let ttl = i64::try_from(self.ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX);
        self.age(now) <= ttl
    }
}
