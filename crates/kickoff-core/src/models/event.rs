//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Remote identifier of a single match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for EventId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A single sports match
///
/// Identity is the remote `id` alone: two values with the same id compare
/// equal and hash identically even when scores or kickoff time differ. Use
/// [`Event::same_contents`] when field-level changes matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub tournament_name: String,
    pub home_team: String,
    pub away_team: String,
    /// `None` until the match has started or when the score is unavailable
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub start_time: DateTime<Utc>,
    /// Local-only flag, never sent by the remote API
    pub favourite: bool,
}

impl Event {
    /// Compare every field, not just the identifier
    #[must_use]
    pub fn same_contents(&self, other: &Self) -> bool {
        self.id == other.id
            && self.tournament_name == other.tournament_name
            && self.home_team == other.home_team
            && self.away_team == other.away_team
            && self.home_score == other.home_score
            && self.away_score == other.away_score
            && self.start_time == other.start_time
            && self.favourite == other.favourite
    }

    /// Replacement value with the favourite flag set
    #[must_use]
    pub fn with_favourite(self, favourite: bool) -> Self {
        Self { favourite, ..self }
    }

    #[must_use]
    pub const fn has_started(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }

    /// Short "Home 1 - 0 Away" line, with a dash for missing scores
    #[must_use]
    pub fn score_line(&self) -> String {
        let score = |value: Option<i32>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
        format!(
            "{} {} - {} {}",
            self.home_team,
            score(self.home_score),
            score(self.away_score),
            self.away_team
        )
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
pub(crate) fn sample_event(id: i64) -> Event {
    Event {
        id: EventId::new(id),
        tournament_name: "Premier League".to_string(),
        home_team: "Brentford".to_string(),
        away_team: "Burnley".to_string(),
        home_score: None,
        away_score: None,
        start_time: DateTime::from_timestamp(1_697_371_200, 0).unwrap_or_default(),
        favourite: false,
    }
}
