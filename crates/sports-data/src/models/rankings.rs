use serde::{Deserialize, Serialize};

use super::types::{EntityId, Season};

/// Direction a ranked team moved since the previous poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Same,
    New,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankedTeam {
    pub rank: u32,
    pub team_id: EntityId,
    pub team_name: String,
    pub conference: String,
    pub record: String,
    pub points: u32,
    pub previous_rank: u32,
    pub trend: Trend,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Poll {
    /// "AP Top 25", "Coaches Poll", "NET Rankings"
    pub name: String,
    pub season: Season,
    pub week: u8,
    pub date: String,
    pub teams: Vec<RankedTeam>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandingsEntry {
    pub team_id: EntityId,
    pub team_name: String,
    pub conference_rank: u32,
    pub overall_record: String,
    pub conference_record: String,
    /// e.g. "W3", "L1"
    pub streak: String,
    pub last_10: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConferenceStandings {
    pub conference: String,
    pub season: Season,
    pub teams: Vec<StandingsEntry>,
}
