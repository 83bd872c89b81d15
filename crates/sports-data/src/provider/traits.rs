//! Sports data provider trait definitions.
//!
//! This module defines the core `SportsDataProvider` trait that all
//! upstream adapters must implement.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::ProviderError;
use crate::models::{
    BoxScore, ConferenceStandings, DataValue, Game, Operation, PlayByPlay, Player, PlayerStats,
    Poll, PollType, Season, StatLeader, Team, TeamStats,
};

use super::capabilities::{Capability, RateLimit};

fn not_supported<T>(operation: &'static str) -> Result<T, ProviderError> {
    Err(ProviderError::NotSupported { operation })
}

/// Trait for sports data providers.
///
/// Implement this trait to add support for a new upstream (ESPN, NCAA, ...).
/// The registry uses the provider's capabilities and priority to decide when
/// to ask it. Every operation method has a default that reports
/// `NotSupported`; a provider overrides the ones matching its capabilities.
///
/// A method must either return a complete value or an error, never a
/// partially populated result.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use cbb_sports_data::provider::{Capability, SportsDataProvider};
///
/// struct NcaaProvider { http: HttpTransport }
///
/// #[async_trait]
/// impl SportsDataProvider for NcaaProvider {
///     fn id(&self) -> &'static str {
///         "ncaa"
///     }
///
///     fn priority(&self) -> u8 {
///         2
///     }
///
///     fn capabilities(&self) -> &[Capability] {
///         &[Capability::LiveScores, Capability::Rankings]
///     }
///
///     // ... implement get_live_scores and get_rankings
/// }
/// ```
#[async_trait]
pub trait SportsDataProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "espn".
    ///
    /// Used for logging, rate limiting and provenance.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values are tried first. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Capabilities this provider can answer.
    fn capabilities(&self) -> &[Capability];

    /// Rate limiting configuration.
    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    async fn get_live_scores(
        &self,
        date: NaiveDate,
        conference: Option<&str>,
        top25: bool,
    ) -> Result<Vec<Game>, ProviderError> {
        let _ = (date, conference, top25);
        not_supported("get_live_scores")
    }

    async fn get_team(&self, team_id: &str) -> Result<Team, ProviderError> {
        let _ = team_id;
        not_supported("get_team")
    }

    async fn search_teams(
        &self,
        query: &str,
        conference: Option<&str>,
    ) -> Result<Vec<Team>, ProviderError> {
        let _ = (query, conference);
        not_supported("search_teams")
    }

    async fn get_roster(&self, team_id: &str) -> Result<Vec<Player>, ProviderError> {
        let _ = team_id;
        not_supported("get_roster")
    }

    async fn get_schedule(
        &self,
        team_id: &str,
        season: Season,
    ) -> Result<Vec<Game>, ProviderError> {
        let _ = (team_id, season);
        not_supported("get_schedule")
    }

    async fn get_game_detail(&self, game_id: &str) -> Result<Game, ProviderError> {
        let _ = game_id;
        not_supported("get_game_detail")
    }

    async fn get_box_score(&self, game_id: &str) -> Result<BoxScore, ProviderError> {
        let _ = game_id;
        not_supported("get_box_score")
    }

    async fn get_play_by_play(&self, game_id: &str) -> Result<PlayByPlay, ProviderError> {
        let _ = game_id;
        not_supported("get_play_by_play")
    }

    async fn get_rankings(
        &self,
        poll: PollType,
        season: Season,
        week: u8,
    ) -> Result<Poll, ProviderError> {
        let _ = (poll, season, week);
        not_supported("get_rankings")
    }

    async fn get_standings(
        &self,
        conference: Option<&str>,
    ) -> Result<Vec<ConferenceStandings>, ProviderError> {
        let _ = conference;
        not_supported("get_standings")
    }

    async fn get_team_stats(
        &self,
        team_id: &str,
        season: Season,
    ) -> Result<TeamStats, ProviderError> {
        let _ = (team_id, season);
        not_supported("get_team_stats")
    }

    async fn get_player_stats(
        &self,
        player_id: Option<&str>,
        team_id: Option<&str>,
    ) -> Result<Vec<PlayerStats>, ProviderError> {
        let _ = (player_id, team_id);
        not_supported("get_player_stats")
    }

    async fn get_stat_leaders(
        &self,
        category: &str,
        season: Season,
    ) -> Result<Vec<StatLeader>, ProviderError> {
        let _ = (category, season);
        not_supported("get_stat_leaders")
    }

    /// Dispatch an operation to the matching method.
    ///
    /// The resolver calls this; adapters normally don't override it.
    async fn execute(&self, operation: &Operation) -> Result<DataValue, ProviderError> {
        let value = match operation {
            Operation::LiveScores {
                date,
                conference,
                top25,
            } => DataValue::Games(
                self.get_live_scores(*date, conference.as_deref(), *top25)
                    .await?,
            ),
            Operation::Team { team_id } => DataValue::Team(self.get_team(team_id).await?),
            Operation::SearchTeams { query, conference } => {
                DataValue::Teams(self.search_teams(query, conference.as_deref()).await?)
            }
            Operation::Roster { team_id } => DataValue::Roster(self.get_roster(team_id).await?),
            Operation::Schedule { team_id, season } => {
                DataValue::Games(self.get_schedule(team_id, *season).await?)
            }
            Operation::GameDetail { game_id } => {
                DataValue::Game(self.get_game_detail(game_id).await?)
            }
            Operation::BoxScore { game_id } => {
                DataValue::BoxScore(self.get_box_score(game_id).await?)
            }
            Operation::PlayByPlay { game_id } => {
                DataValue::PlayByPlay(self.get_play_by_play(game_id).await?)
            }
            Operation::Rankings { poll, season, week } => {
                DataValue::Poll(self.get_rankings(*poll, *season, *week).await?)
            }
            Operation::Standings { conference } => {
                DataValue::Standings(self.get_standings(conference.as_deref()).await?)
            }
            Operation::TeamStats { team_id, season } => {
                DataValue::TeamStats(self.get_team_stats(team_id, *season).await?)
            }
            Operation::PlayerStats { player_id, team_id } => DataValue::PlayerStats(
                self.get_player_stats(player_id.as_deref(), team_id.as_deref())
                    .await?,
            ),
            Operation::StatLeaders { category, season } => {
                DataValue::StatLeaders(self.get_stat_leaders(category, *season).await?)
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RosterOnly;

    #[async_trait]
    impl SportsDataProvider for RosterOnly {
        fn id(&self) -> &'static str {
            "roster_only"
        }

        fn capabilities(&self) -> &[Capability] {
            &[Capability::Roster]
        }

        async fn get_roster(&self, team_id: &str) -> Result<Vec<Player>, ProviderError> {
            Ok(vec![Player {
                id: format!("{}-1", team_id),
                name: "Walter Clayton Jr.".to_string(),
                ..Default::default()
            }])
        }
    }

    #[tokio::test]
    async fn test_execute_dispatches_to_operation_method() {
        let provider = RosterOnly;
        let value = provider
            .execute(&Operation::Roster {
                team_id: "57".to_string(),
            })
            .await
            .unwrap();

        match value {
            DataValue::Roster(players) => assert_eq!(players[0].id, "57-1"),
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unimplemented_operation_is_not_supported() {
        let provider = RosterOnly;
        let err = provider
            .execute(&Operation::GameDetail {
                game_id: "401".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProviderError::NotSupported {
                operation: "get_game_detail"
            }
        ));
        assert_eq!(provider.priority(), 10);
    }
}
