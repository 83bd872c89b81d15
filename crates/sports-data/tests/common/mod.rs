//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use cbb_sports_data::{
    Capability, Game, Player, PlayByPlay, Poll, PollType, ProviderError, SportsDataConfig,
    SportsDataProvider,
};
use cbb_sports_data::models::{RankedTeam, TeamScore};

/// Records the order in which providers were called.
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

/// Configurable provider double. Answers tag themselves with the provider id
/// so provenance can be checked against the payload.
pub struct MockProvider {
    id: &'static str,
    priority: u8,
    capabilities: Vec<Capability>,
    fail: bool,
    delay: Duration,
    calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    log: Option<CallLog>,
}

impl MockProvider {
    pub fn new(id: &'static str, priority: u8, capabilities: &[Capability]) -> Self {
        Self {
            id,
            priority,
            capabilities: capabilities.to_vec(),
            fail: false,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            log: None,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were running at the same time.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    async fn call<T>(&self, answer: impl FnOnce() -> T) -> Result<T, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.lock().unwrap().push(self.id);
        }

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            Err(ProviderError::Upstream(format!("{} is down", self.id)))
        } else {
            Ok(answer())
        }
    }
}

#[async_trait]
impl SportsDataProvider for MockProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    async fn get_live_scores(
        &self,
        date: NaiveDate,
        _conference: Option<&str>,
        _top25: bool,
    ) -> Result<Vec<Game>, ProviderError> {
        self.call(|| {
            vec![Game {
                id: format!("{}-{}", self.id, date.format("%Y%m%d")),
                home: TeamScore {
                    team_name: "Houston".to_string(),
                    score: 71,
                    ..Default::default()
                },
                away: TeamScore {
                    team_name: "Iowa State".to_string(),
                    score: 64,
                    ..Default::default()
                },
                ..Default::default()
            }]
        })
        .await
    }

    async fn get_roster(&self, team_id: &str) -> Result<Vec<Player>, ProviderError> {
        self.call(|| {
            vec![Player {
                id: format!("{}-{}-1", self.id, team_id),
                name: "Cooper Flagg".to_string(),
                ..Default::default()
            }]
        })
        .await
    }

    async fn get_play_by_play(&self, game_id: &str) -> Result<PlayByPlay, ProviderError> {
        self.call(|| PlayByPlay {
            game: Game {
                id: game_id.to_string(),
                ..Default::default()
            },
            ..Default::default()
        })
        .await
    }

    async fn get_rankings(
        &self,
        poll: PollType,
        season: u16,
        week: u8,
    ) -> Result<Poll, ProviderError> {
        self.call(|| Poll {
            name: format!("{} {}", self.id, poll.as_str()),
            season,
            week,
            teams: vec![RankedTeam {
                rank: 1,
                team_name: "Auburn".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        })
        .await
    }
}

/// Defaults suited to tests: cache under `dir`, short bounds.
pub fn test_config(dir: &std::path::Path) -> SportsDataConfig {
    let mut config = SportsDataConfig::default();
    config.cache.dir = dir.to_path_buf();
    config.provider_timeout = Duration::from_secs(5);
    config.rate_limit_wait = Duration::from_secs(5);
    config.admission_timeout = Duration::from_secs(30);
    config
}

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}
