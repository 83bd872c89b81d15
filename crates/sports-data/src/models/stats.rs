use serde::{Deserialize, Serialize};

use super::types::{EntityId, Season};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamStats {
    pub team_id: EntityId,
    pub team_name: String,
    pub season: Season,
    pub games_played: u32,
    pub ppg: f64,
    pub opp_ppg: f64,
    pub fg_pct: f64,
    pub three_pct: f64,
    pub ft_pct: f64,
    pub rpg: f64,
    pub apg: f64,
    pub spg: f64,
    pub bpg: f64,
    pub topg: f64,
    pub offensive_rpg: f64,
    pub defensive_rpg: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub player_id: EntityId,
    pub name: String,
    pub team: String,
    pub position: String,
    pub games_played: u32,
    pub minutes_per_game: f64,
    pub ppg: f64,
    pub rpg: f64,
    pub apg: f64,
    pub spg: f64,
    pub bpg: f64,
    pub topg: f64,
    pub fg_pct: f64,
    pub three_pct: f64,
    pub ft_pct: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatLeader {
    pub rank: u32,
    pub player_id: EntityId,
    pub name: String,
    pub team: String,
    pub value: f64,
    pub stat_category: String,
}
