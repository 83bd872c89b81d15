use serde::{Deserialize, Serialize};

use super::games::{BoxScore, Game, PlayByPlay};
use super::operation::Operation;
use super::rankings::{ConferenceStandings, Poll};
use super::stats::{PlayerStats, StatLeader, TeamStats};
use super::teams::{Player, Team};

/// A resolved domain value, tagged so it round-trips through the disk cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DataValue {
    Games(Vec<Game>),
    Team(Team),
    Teams(Vec<Team>),
    Roster(Vec<Player>),
    Game(Game),
    BoxScore(BoxScore),
    PlayByPlay(PlayByPlay),
    Poll(Poll),
    Standings(Vec<ConferenceStandings>),
    TeamStats(TeamStats),
    PlayerStats(Vec<PlayerStats>),
    StatLeaders(Vec<StatLeader>),
}

impl DataValue {
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Games(_) => "games",
            Self::Team(_) => "team",
            Self::Teams(_) => "teams",
            Self::Roster(_) => "roster",
            Self::Game(_) => "game",
            Self::BoxScore(_) => "box_score",
            Self::PlayByPlay(_) => "play_by_play",
            Self::Poll(_) => "poll",
            Self::Standings(_) => "standings",
            Self::TeamStats(_) => "team_stats",
            Self::PlayerStats(_) => "player_stats",
            Self::StatLeaders(_) => "stat_leaders",
        }
    }

    /// Basic well-formedness check of a provider answer for `operation`.
    ///
    /// The variant must be the one the operation produces, and single-entity
    /// answers must carry an identity. Empty lists are fine where "nothing"
    /// is a legitimate answer (no games on a date) but not for a roster or a
    /// poll.
    pub fn check_well_formed(&self, operation: &Operation) -> Result<(), String> {
        let ok = match (operation, self) {
            (Operation::LiveScores { .. }, Self::Games(games))
            | (Operation::Schedule { .. }, Self::Games(games)) => {
                if games.iter().any(|g| g.id.trim().is_empty()) {
                    return Err("game without id".to_string());
                }
                true
            }
            (Operation::Team { .. }, Self::Team(team)) => {
                if team.id.trim().is_empty() && team.name.trim().is_empty() {
                    return Err("empty team".to_string());
                }
                true
            }
            (Operation::SearchTeams { .. }, Self::Teams(_)) => true,
            (Operation::Roster { .. }, Self::Roster(players)) => {
                if players.is_empty() {
                    return Err("empty roster".to_string());
                }
                true
            }
            (Operation::GameDetail { .. }, Self::Game(game)) => {
                if game.id.trim().is_empty() {
                    return Err("game without id".to_string());
                }
                true
            }
            (Operation::BoxScore { .. }, Self::BoxScore(box_score)) => {
                if box_score.game.id.trim().is_empty() {
                    return Err("box score without game".to_string());
                }
                true
            }
            (Operation::PlayByPlay { .. }, Self::PlayByPlay(pbp)) => {
                if pbp.game.id.trim().is_empty() && pbp.plays.is_empty() {
                    return Err("empty play-by-play".to_string());
                }
                true
            }
            (Operation::Rankings { .. }, Self::Poll(poll)) => {
                if poll.teams.is_empty() {
                    return Err("poll without teams".to_string());
                }
                true
            }
            (Operation::Standings { .. }, Self::Standings(_)) => true,
            (Operation::TeamStats { .. }, Self::TeamStats(stats)) => {
                if stats.games_played == 0 && stats.ppg == 0.0 {
                    return Err("empty team stats".to_string());
                }
                true
            }
            (Operation::PlayerStats { .. }, Self::PlayerStats(_)) => true,
            (Operation::StatLeaders { .. }, Self::StatLeaders(_)) => true,
            _ => false,
        };

        if ok {
            Ok(())
        } else {
            Err(format!(
                "{} returned {} data",
                operation.name(),
                self.variant_name()
            ))
        }
    }
}
