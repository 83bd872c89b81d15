use serde::{Deserialize, Serialize};

use super::types::EntityId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamScore {
    pub team_id: EntityId,
    pub team_name: String,
    pub abbreviation: String,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    pub record: String,
    pub logo_url: String,
    /// Per-half (or per-period) scores
    pub line_scores: Vec<u32>,
}

impl TeamScore {
    pub fn display_name(&self) -> String {
        match self.rank {
            Some(rank) => format!("#{} {}", rank, self.team_name),
            None => self.team_name.clone(),
        }
    }
}

/// Game state as reported by the upstream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Pre,
    In,
    Post,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Game {
    pub id: EntityId,
    /// ISO-8601 start time
    pub date: String,
    pub status: GameStatus,
    /// e.g. "Final", "Halftime", "2nd Half 12:34"
    pub status_detail: String,
    pub period: u32,
    pub clock: String,
    pub venue: String,
    pub broadcast: String,
    pub conference_game: bool,
    pub neutral_site: bool,
    pub home: TeamScore,
    pub away: TeamScore,
    /// Tournament round and similar notes
    pub notes: String,
}

impl Game {
    pub fn final_score(&self) -> String {
        format!(
            "{} {} - {} {}",
            self.away.display_name(),
            self.away.score,
            self.home.score,
            self.home.display_name()
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerBoxScore {
    pub player_id: EntityId,
    pub name: String,
    pub position: String,
    pub minutes: String,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub fouls: u32,
    pub fgm: u32,
    pub fga: u32,
    pub fg_pct: f64,
    pub tpm: u32,
    pub tpa: u32,
    pub tp_pct: f64,
    pub ftm: u32,
    pub fta: u32,
    pub ft_pct: f64,
    pub offensive_rebounds: u32,
    pub defensive_rebounds: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamBoxScore {
    pub team_id: EntityId,
    pub team_name: String,
    pub players: Vec<PlayerBoxScore>,
    pub totals: PlayerBoxScore,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxScore {
    pub game: Game,
    pub home: TeamBoxScore,
    pub away: TeamBoxScore,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Play {
    pub id: EntityId,
    pub sequence: u32,
    pub period: u32,
    pub clock: String,
    pub description: String,
    pub team_id: EntityId,
    pub score_home: u32,
    pub score_away: u32,
    pub scoring_play: bool,
    pub shot_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate_y: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayByPlay {
    pub game: Game,
    pub plays: Vec<Play>,
}
