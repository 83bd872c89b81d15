use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{EntityId, Season};
use crate::cache::TtlClass;
use crate::errors::SportsDataError;
use crate::provider::Capability;

/// Which poll a rankings request asks for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollType {
    #[default]
    Ap,
    Coaches,
    Net,
}

impl PollType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ap => "ap",
            Self::Coaches => "coaches",
            Self::Net => "net",
        }
    }
}

impl FromStr for PollType {
    type Err = SportsDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "ap" => Ok(Self::Ap),
            "coaches" | "usa_today" | "usa today" => Ok(Self::Coaches),
            "net" => Ok(Self::Net),
            other => Err(SportsDataError::validation(format!(
                "Unknown poll type: {}",
                other
            ))),
        }
    }
}

/// A logical data request: one variant per provider operation, carrying its
/// typed arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    LiveScores {
        date: NaiveDate,
        conference: Option<String>,
        top25: bool,
    },
    Team {
        team_id: EntityId,
    },
    SearchTeams {
        query: String,
        conference: Option<String>,
    },
    Roster {
        team_id: EntityId,
    },
    Schedule {
        team_id: EntityId,
        season: Season,
    },
    GameDetail {
        game_id: EntityId,
    },
    BoxScore {
        game_id: EntityId,
    },
    PlayByPlay {
        game_id: EntityId,
    },
    Rankings {
        poll: PollType,
        season: Season,
        week: u8,
    },
    Standings {
        conference: Option<String>,
    },
    TeamStats {
        team_id: EntityId,
        season: Season,
    },
    PlayerStats {
        player_id: Option<EntityId>,
        team_id: Option<EntityId>,
    },
    StatLeaders {
        category: String,
        season: Season,
    },
}

impl Operation {
    /// Stable operation name, also the first component of the cache key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LiveScores { .. } => "get_live_scores",
            Self::Team { .. } => "get_team",
            Self::SearchTeams { .. } => "search_teams",
            Self::Roster { .. } => "get_roster",
            Self::Schedule { .. } => "get_schedule",
            Self::GameDetail { .. } => "get_game_detail",
            Self::BoxScore { .. } => "get_box_score",
            Self::PlayByPlay { .. } => "get_play_by_play",
            Self::Rankings { .. } => "get_rankings",
            Self::Standings { .. } => "get_standings",
            Self::TeamStats { .. } => "get_team_stats",
            Self::PlayerStats { .. } => "get_player_stats",
            Self::StatLeaders { .. } => "get_stat_leaders",
        }
    }

    /// Capability a provider must declare to be asked for this operation.
    pub fn capability(&self) -> Capability {
        match self {
            Self::LiveScores { .. } => Capability::LiveScores,
            Self::Team { .. } => Capability::TeamInfo,
            Self::SearchTeams { .. } => Capability::TeamSearch,
            Self::Roster { .. } => Capability::Roster,
            Self::Schedule { .. } => Capability::Schedule,
            Self::GameDetail { .. } => Capability::GameDetail,
            Self::BoxScore { .. } => Capability::BoxScore,
            Self::PlayByPlay { .. } => Capability::PlayByPlay,
            Self::Rankings { .. } => Capability::Rankings,
            Self::Standings { .. } => Capability::Standings,
            Self::TeamStats { .. } => Capability::TeamStats,
            Self::PlayerStats { .. } => Capability::PlayerStats,
            Self::StatLeaders { .. } => Capability::StatLeaders,
        }
    }

    /// Volatility class of the data this operation returns.
    pub fn ttl_class(&self) -> TtlClass {
        match self {
            Self::LiveScores { .. } => TtlClass::Live,
            Self::GameDetail { .. } | Self::BoxScore { .. } => TtlClass::InGame,
            Self::PlayByPlay { .. } => TtlClass::PlayByPlay,
            Self::Schedule { .. }
            | Self::Rankings { .. }
            | Self::Standings { .. }
            | Self::TeamStats { .. }
            | Self::PlayerStats { .. }
            | Self::StatLeaders { .. } => TtlClass::Hourly,
            Self::Team { .. } | Self::SearchTeams { .. } | Self::Roster { .. } => {
                TtlClass::Daily
            }
        }
    }

    /// Normalized arguments as `(name, value)` pairs.
    ///
    /// Text that upstreams treat case-insensitively is lower-cased and every
    /// value is trimmed, so logically identical requests produce identical
    /// pairs. Absent optionals encode as the empty string.
    pub fn args(&self) -> Vec<(&'static str, String)> {
        fn text(value: &str) -> String {
            value.trim().to_lowercase()
        }
        fn opt_text(value: &Option<String>) -> String {
            value.as_deref().map(text).unwrap_or_default()
        }
        fn id(value: &str) -> String {
            value.trim().to_string()
        }

        match self {
            Self::LiveScores {
                date,
                conference,
                top25,
            } => vec![
                ("date", date.format("%Y-%m-%d").to_string()),
                ("conference", opt_text(conference)),
                ("top25", top25.to_string()),
            ],
            Self::Team { team_id } | Self::Roster { team_id } => {
                vec![("team_id", id(team_id))]
            }
            Self::SearchTeams { query, conference } => {
                vec![("query", text(query)), ("conference", opt_text(conference))]
            }
            Self::Schedule { team_id, season } | Self::TeamStats { team_id, season } => {
                vec![("team_id", id(team_id)), ("season", season.to_string())]
            }
            Self::GameDetail { game_id }
            | Self::BoxScore { game_id }
            | Self::PlayByPlay { game_id } => vec![("game_id", id(game_id))],
            Self::Rankings { poll, season, week } => vec![
                ("poll", poll.as_str().to_string()),
                ("season", season.to_string()),
                ("week", week.to_string()),
            ],
            Self::Standings { conference } => vec![("conference", opt_text(conference))],
            Self::PlayerStats { player_id, team_id } => vec![
                (
                    "player_id",
                    player_id.as_deref().map(id).unwrap_or_default(),
                ),
                ("team_id", team_id.as_deref().map(id).unwrap_or_default()),
            ],
            Self::StatLeaders { category, season } => {
                vec![("category", text(category)), ("season", season.to_string())]
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .args()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({})", self.name(), args)
    }
}
