use std::borrow::Cow;

/// Provider identifier - mostly static constants ("espn", "ncaa", ...)
pub type ProviderId = Cow<'static, str>;

/// Upstream identifier for a team, game or player
pub type EntityId = String;

/// Season year, `0` meaning the current season
pub type Season = u16;
