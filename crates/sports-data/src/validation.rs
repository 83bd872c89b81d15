//! Request validation performed before admission.
//!
//! Nothing here touches a provider or the cache: a request that fails is
//! rejected with [`SportsDataError::Validation`] and costs nothing else.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::SportsDataError;
use crate::models::{Operation, Season};
use crate::provider::Capability;

/// Longest accepted free-text argument, in characters.
pub const MAX_TEXT_LEN: usize = 200;

pub const MIN_SEASON: Season = 2000;
pub const MAX_SEASON: Season = 2100;
pub const MAX_WEEK: u8 = 25;

lazy_static! {
    /// Entity ids: ASCII alphanumerics, `_` and `-`, 1 to 30 characters.
    static ref ID_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9_-]{1,30}$").expect("Invalid regex pattern");
}

fn text(field: &str, value: &str) -> Result<(), SportsDataError> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(SportsDataError::validation(format!(
            "{} too long (max {} characters)",
            field, MAX_TEXT_LEN
        )));
    }
    Ok(())
}

fn required_text(field: &str, value: &str) -> Result<(), SportsDataError> {
    text(field, value)?;
    if value.trim().is_empty() {
        return Err(SportsDataError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn optional_text(field: &str, value: &Option<String>) -> Result<(), SportsDataError> {
    value.as_deref().map_or(Ok(()), |v| text(field, v))
}

fn id(field: &str, value: &str) -> Result<(), SportsDataError> {
    if !ID_REGEX.is_match(value.trim()) {
        return Err(SportsDataError::validation(format!(
            "Invalid {} format",
            field
        )));
    }
    Ok(())
}

/// Returns whether a non-empty id was given.
fn optional_id(field: &str, value: &Option<String>) -> Result<bool, SportsDataError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) => id(field, v).map(|_| true),
    }
}

/// Season `0` means "current"; anything else must be a plausible year.
pub fn season(value: Season) -> Result<(), SportsDataError> {
    if value == 0 || (MIN_SEASON..=MAX_SEASON).contains(&value) {
        Ok(())
    } else {
        Err(SportsDataError::validation(format!(
            "Season must be between {} and {}",
            MIN_SEASON, MAX_SEASON
        )))
    }
}

/// Validate an operation and its declared capability.
pub fn validate(capability: Capability, operation: &Operation) -> Result<(), SportsDataError> {
    if operation.capability() != capability {
        return Err(SportsDataError::validation(format!(
            "{} requires capability {}, not {}",
            operation.name(),
            operation.capability(),
            capability
        )));
    }

    match operation {
        Operation::LiveScores { conference, .. } => optional_text("conference", conference),
        Operation::Team { team_id } | Operation::Roster { team_id } => id("team_id", team_id),
        Operation::SearchTeams { query, conference } => {
            required_text("query", query)?;
            optional_text("conference", conference)
        }
        Operation::Schedule { team_id, season: s } | Operation::TeamStats { team_id, season: s } => {
            id("team_id", team_id)?;
            season(*s)
        }
        Operation::GameDetail { game_id }
        | Operation::BoxScore { game_id }
        | Operation::PlayByPlay { game_id } => id("game_id", game_id),
        Operation::Rankings { season: s, week, .. } => {
            season(*s)?;
            if *week > MAX_WEEK {
                return Err(SportsDataError::validation(format!(
                    "Week must be between 0 and {}",
                    MAX_WEEK
                )));
            }
            Ok(())
        }
        Operation::Standings { conference } => optional_text("conference", conference),
        Operation::PlayerStats { player_id, team_id } => {
            let has_player = optional_id("player_id", player_id)?;
            let has_team = optional_id("team_id", team_id)?;
            if !has_player && !has_team {
                return Err(SportsDataError::validation(
                    "player_id or team_id is required",
                ));
            }
            Ok(())
        }
        Operation::StatLeaders { category, season: s } => {
            required_text("category", category)?;
            season(*s)
        }
    }
}

/// Parse a user-supplied date. Accepts `YYYY-MM-DD`, `MM/DD/YYYY`,
/// `MM-DD-YYYY` and `YYYYMMDD`. An empty string yields `None` (today).
pub fn parse_date(raw: &str) -> Result<Option<NaiveDate>, SportsDataError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if raw.len() > 20 {
        return Err(SportsDataError::validation("Invalid date format"));
    }

    ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%Y%m%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(Some)
        .ok_or_else(|| {
            SportsDataError::validation(format!(
                "Unrecognized date format: {}. Use YYYY-MM-DD.",
                raw
            ))
        })
}
