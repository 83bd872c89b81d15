use serde::{Deserialize, Serialize};

/// Win/loss record, overall and in conference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub conference_wins: u32,
    pub conference_losses: u32,
}

impl Record {
    pub fn overall(&self) -> String {
        format!("{}-{}", self.wins, self.losses)
    }

    pub fn conference(&self) -> String {
        format!("{}-{}", self.conference_wins, self.conference_losses)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Venue {
    pub name: String,
    pub city: String,
    pub state: String,
    pub capacity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_formatting() {
        let record = Record {
            wins: 20,
            losses: 5,
            conference_wins: 11,
            conference_losses: 3,
        };
        assert_eq!(record.overall(), "20-5");
        assert_eq!(record.conference(), "11-3");
    }
}
