//! Client configuration loaded from the environment.
//!
//! Every setting has a default, so an empty environment yields a working
//! configuration pointed at the public API.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::models::TournamentId;
use crate::remote::HttpSourceConfig;
use crate::util::parse_http_url;

pub const DEFAULT_API_BASE_URL: &str = "https://api.sofascore.com/api/v1";

const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "10";
const DEFAULT_PROBE_TIMEOUT_MS: &str = "1500";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub tournament_id: TournamentId,
    pub request_timeout: Duration,
    /// Overrides the platform default database location
    pub database_path: Option<PathBuf>,
    pub probe_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = value_or_default(&lookup, "KICKOFF_API_BASE_URL", DEFAULT_API_BASE_URL);
        if parse_http_url(&api_base_url).is_none() {
            return Err(ConfigError::Invalid(
                "KICKOFF_API_BASE_URL must be an http:// or https:// URL with a host".to_string(),
            ));
        }
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let tournament_id = optional_trimmed(&lookup, "KICKOFF_TOURNAMENT_ID")
            .map(TournamentId::new)
            .transpose()
            .map_err(|error| ConfigError::Invalid(format!("KICKOFF_TOURNAMENT_ID: {error}")))?
            .unwrap_or_default();

        let request_timeout_secs = value_or_default(
            &lookup,
            "KICKOFF_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )
        .parse::<u64>()
        .map_err(|_| {
            ConfigError::Invalid(
                "KICKOFF_REQUEST_TIMEOUT_SECS must be an integer in [1, 120]".to_string(),
            )
        })?;
        if !(1..=120).contains(&request_timeout_secs) {
            return Err(ConfigError::Invalid(
                "KICKOFF_REQUEST_TIMEOUT_SECS must be in [1, 120]".to_string(),
            ));
        }

        let probe_timeout_ms =
            value_or_default(&lookup, "KICKOFF_PROBE_TIMEOUT_MS", DEFAULT_PROBE_TIMEOUT_MS)
                .parse::<u64>()
                .map_err(|_| {
                    ConfigError::Invalid(
                        "KICKOFF_PROBE_TIMEOUT_MS must be an integer in [50, 10000]".to_string(),
                    )
                })?;
        if !(50..=10_000).contains(&probe_timeout_ms) {
            return Err(ConfigError::Invalid(
                "KICKOFF_PROBE_TIMEOUT_MS must be in [50, 10000]".to_string(),
            ));
        }

        let database_path = optional_trimmed(&lookup, "KICKOFF_DB_PATH").map(PathBuf::from);

        Ok(Self {
            api_base_url,
            tournament_id,
            request_timeout: Duration::from_secs(request_timeout_secs),
            database_path,
            probe_timeout: Duration::from_millis(probe_timeout_ms),
        })
    }

    /// Settings for [`crate::remote::HttpEventSource`]
    pub fn http_source(&self) -> HttpSourceConfig {
        HttpSourceConfig {
            base_url: self.api_base_url.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            tournament_id: TournamentId::default(),
            request_timeout: Duration::from_secs(10),
            database_path: None,
            probe_timeout: Duration::from_millis(1_500),
        }
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        ClientConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(load(&[]).unwrap(), ClientConfig::default());
    }

    #[test]
    fn overrides_are_trimmed_and_applied() {
        let config = load(&[
            ("KICKOFF_API_BASE_URL", " http://localhost:8080/api/ "),
            ("KICKOFF_TOURNAMENT_ID", "8"),
            ("KICKOFF_REQUEST_TIMEOUT_SECS", "3"),
            ("KICKOFF_DB_PATH", "/tmp/kickoff.db"),
            ("KICKOFF_PROBE_TIMEOUT_MS", "250"),
        ])
        .unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.tournament_id.as_str(), "8");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/kickoff.db")));
        assert_eq!(config.probe_timeout, Duration::from_millis(250));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("KICKOFF_TOURNAMENT_ID", "  "), ("KICKOFF_DB_PATH", "")]).unwrap();
        assert_eq!(config.tournament_id, TournamentId::default());
        assert_eq!(config.database_path, None);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = load(&[("KICKOFF_API_BASE_URL", "ftp://example.com")]).unwrap_err();
        assert!(err.to_string().contains("KICKOFF_API_BASE_URL"));
        assert!(load(&[("KICKOFF_API_BASE_URL", "https://")]).is_err());
    }

    #[test]
    fn accepts_ipv6_base_url() {
        let config = load(&[("KICKOFF_API_BASE_URL", "http://[::1]:8080/api/v1/")]).unwrap();
        assert_eq!(config.api_base_url, "http://[::1]:8080/api/v1");
    }

    #[test]
    fn rejects_out_of_range_timeouts() {
        assert!(load(&[("KICKOFF_REQUEST_TIMEOUT_SECS", "0")]).is_err());
        assert!(load(&[("KICKOFF_REQUEST_TIMEOUT_SECS", "ten")]).is_err());
        assert!(load(&[("KICKOFF_PROBE_TIMEOUT_MS", "20000")]).is_err());
    }

    #[test]
    fn http_source_carries_url_and_timeout() {
        let source = ClientConfig::default().http_source();
        assert_eq!(source.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(source.request_timeout, Duration::from_secs(10));
    }
}
