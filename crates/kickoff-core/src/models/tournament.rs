//! Tournament identifier

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::util::normalize_text_option;

/// Tournament shown when no other is configured
pub const DEFAULT_TOURNAMENT_ID: &str = "17";

/// Opaque tournament identifier, validated only as non-empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TournamentId(String);

impl TournamentId {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        normalize_text_option(Some(raw.into()))
            .map(Self)
            .ok_or_else(|| Error::InvalidInput("tournament id must not be empty".into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TournamentId {
    fn default() -> Self {
        Self(DEFAULT_TOURNAMENT_ID.to_string())
    }
}

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TournamentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for TournamentId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TournamentId> for String {
    fn from(value: TournamentId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tournament_id_trims() {
        let id = TournamentId::new("  17 ").unwrap();
        assert_eq!(id.as_str(), "17");
    }

    #[test]
    fn test_tournament_id_rejects_empty() {
        assert!(TournamentId::new("   ").is_err());
        assert!("".parse::<TournamentId>().is_err());
    }

    #[test]
    fn test_default_tournament() {
        assert_eq!(TournamentId::default().as_str(), DEFAULT_TOURNAMENT_ID);
    }
}
