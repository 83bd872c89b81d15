use serde::{Deserialize, Serialize};

use super::common::{Record, Venue};
use super::types::EntityId;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    pub id: EntityId,
    pub name: String,
    pub abbreviation: String,
    pub mascot: String,
    pub conference: String,
    pub logo_url: String,
    pub color: String,
    pub record: Record,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    pub venue: Venue,
}

impl Team {
    /// Name prefixed with the poll rank when ranked, e.g. "#3 Duke".
    pub fn display_name(&self) -> String {
        match self.rank {
            Some(rank) => format!("#{} {}", rank, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub id: EntityId,
    pub name: String,
    pub jersey: String,
    pub position: String,
    pub height: String,
    pub weight: String,
    /// Class year: Fr, So, Jr, Sr
    pub year: String,
    pub hometown: String,
}
