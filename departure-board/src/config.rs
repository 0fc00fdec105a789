//! Process settings.
//!
//! Settings come either from a JSON file named by `TRANSPORT_CONFIG`, or,
//! for the common single-station case, from individual environment
//! variables.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{DEFAULT_LIMIT, DomainError, StationQuery};

/// Path to a JSON settings file. Takes precedence over the variables below.
pub const CONFIG_VAR: &str = "TRANSPORT_CONFIG";
/// Station to poll (required without a settings file).
pub const STATION_VAR: &str = "TRANSPORT_STATION";
/// Number of departures to request.
pub const LIMIT_VAR: &str = "TRANSPORT_LIMIT";
/// Refresh interval in seconds.
pub const REFRESH_VAR: &str = "TRANSPORT_REFRESH_SECS";
/// Base URL of the transport API.
pub const API_BASE_VAR: &str = "TRANSPORT_API_BASE";
/// Address the HTTP server binds to.
pub const LISTEN_VAR: &str = "TRANSPORT_LISTEN";

const DEFAULT_API_BASE: &str = "https://transport.opendata.ch/v1";
const DEFAULT_REFRESH_SECS: u64 = 60;

/// Errors from loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required variable not set
    #[error("{0} is not set")]
    Missing(&'static str),

    /// Variable set to something unparseable
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    /// Settings file unreadable
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Settings file is not valid JSON for [`Settings`]
    #[error("invalid settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// No stations listed
    #[error("no stations configured")]
    NoStations,

    /// A station entry does not form a valid query
    #[error("station {station:?}: {source}")]
    Station {
        station: String,
        source: DomainError,
    },

    /// A station entry has a zero refresh interval
    #[error("station {0:?}: refresh interval must be at least one second")]
    ZeroRefresh(String),
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Base URL of the transport API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Address the HTTP server binds to
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Stations to poll
    pub stations: Vec<StationSettings>,
}

/// Settings for one polled station.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StationSettings {
    /// Station name, id, or search text
    pub station: String,

    /// Number of departures to request
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Seconds between refreshes
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    /// Resolve `station` through the location search before polling
    #[serde(default = "default_resolve")]
    pub resolve: bool,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_refresh_secs() -> u64 {
    DEFAULT_REFRESH_SECS
}

fn default_resolve() -> bool {
    true
}

impl StationSettings {
    /// Settings for `station` with every other field defaulted.
    pub fn new(station: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            limit: DEFAULT_LIMIT,
            refresh_secs: DEFAULT_REFRESH_SECS,
            resolve: true,
        }
    }

    /// Query for polling `station` as written, without resolution.
    pub fn query(&self) -> Result<StationQuery, DomainError> {
        StationQuery::new(self.station.as_str(), self.limit)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(path) = lookup(CONFIG_VAR) {
            return Self::from_file(path);
        }

        let station = lookup(STATION_VAR).ok_or(ConfigError::Missing(STATION_VAR))?;
        let mut entry = StationSettings::new(station);
        if let Some(limit) = parse_var(&lookup, LIMIT_VAR)? {
            entry.limit = limit;
        }
        if let Some(secs) = parse_var(&lookup, REFRESH_VAR)? {
            entry.refresh_secs = secs;
        }

        let settings = Self {
            api_base: lookup(API_BASE_VAR).unwrap_or_else(default_api_base),
            listen: parse_var(&lookup, LISTEN_VAR)?.unwrap_or_else(default_listen),
            stations: vec![entry],
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let settings: Settings =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check that every station can be polled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stations.is_empty() {
            return Err(ConfigError::NoStations);
        }

        for entry in &self.stations {
            entry.query().map_err(|source| ConfigError::Station {
                station: entry.station.clone(),
                source,
            })?;

            if entry.refresh_secs == 0 {
                return Err(ConfigError::ZeroRefresh(entry.station.clone()));
            }
        }

        Ok(())
    }
}

/// Parse an optional variable, rejecting values that don't parse.
fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn single_station_defaults() {
        let settings = Settings::from_lookup(lookup(&[(STATION_VAR, "Bern")])).unwrap();

        assert_eq!(settings.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.listen.to_string(), "127.0.0.1:3000");
        assert_eq!(settings.stations, [StationSettings::new("Bern")]);

        let entry = &settings.stations[0];
        assert_eq!(entry.limit, 5);
        assert_eq!(entry.refresh_interval(), Duration::from_secs(60));
        assert!(entry.resolve);
    }

    #[test]
    fn single_station_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            (STATION_VAR, "Zürich HB"),
            (LIMIT_VAR, "8"),
            (REFRESH_VAR, " 30 "),
            (API_BASE_VAR, "http://localhost:9000/v1"),
            (LISTEN_VAR, "0.0.0.0:8123"),
        ]))
        .unwrap();

        assert_eq!(settings.api_base, "http://localhost:9000/v1");
        assert_eq!(settings.listen.port(), 8123);
        assert_eq!(settings.stations[0].limit, 8);
        assert_eq!(settings.stations[0].refresh_secs, 30);
    }

    #[test]
    fn missing_station() {
        let err = Settings::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(STATION_VAR)));
        assert_eq!(err.to_string(), "TRANSPORT_STATION is not set");
    }

    #[test]
    fn invalid_number() {
        let err =
            Settings::from_lookup(lookup(&[(STATION_VAR, "Bern"), (LIMIT_VAR, "five")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: LIMIT_VAR, .. }));
    }

    #[test]
    fn zero_limit_rejected() {
        let err =
            Settings::from_lookup(lookup(&[(STATION_VAR, "Bern"), (LIMIT_VAR, "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Station {
                source: DomainError::ZeroLimit,
                ..
            }
        ));
    }

    #[test]
    fn zero_refresh_rejected() {
        let err =
            Settings::from_lookup(lookup(&[(STATION_VAR, "Bern"), (REFRESH_VAR, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroRefresh(_)));
    }

    #[test]
    fn loads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transport.json");
        std::fs::write(
            &path,
            r#"{
                "listen": "127.0.0.1:8080",
                "stations": [
                    {"station": "Bern"},
                    {"station": "8507500", "limit": 3, "refresh_secs": 120, "resolve": false}
                ]
            }"#,
        )
        .unwrap();

        let settings =
            Settings::from_lookup(lookup(&[(CONFIG_VAR, path.to_str().unwrap())])).unwrap();

        assert_eq!(settings.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.listen.port(), 8080);
        assert_eq!(settings.stations.len(), 2);
        assert_eq!(settings.stations[0], StationSettings::new("Bern"));
        assert_eq!(settings.stations[1].limit, 3);
        assert_eq!(settings.stations[1].refresh_secs, 120);
        assert!(!settings.stations[1].resolve);
    }

    #[test]
    fn file_takes_precedence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transport.json");
        std::fs::write(&path, r#"{"stations": [{"station": "Thun"}]}"#).unwrap();

        let settings = Settings::from_lookup(lookup(&[
            (CONFIG_VAR, path.to_str().unwrap()),
            (STATION_VAR, "Bern"),
        ]))
        .unwrap();

        assert_eq!(settings.stations[0].station, "Thun");
    }

    #[test]
    fn empty_station_list_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transport.json");
        std::fs::write(&path, r#"{"stations": []}"#).unwrap();

        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NoStations));
    }

    #[test]
    fn malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("transport.json");
        std::fs::write(&path, "stations = []").unwrap();

        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file() {
        let err = Settings::from_file("/nonexistent/transport.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/transport.json"));
    }
}
