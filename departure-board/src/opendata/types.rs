//! Transport API response DTOs.
//!
//! These types map directly to the JSON returned by transport.opendata.ch.
//! They use `Option` everywhere because the API omits or nulls fields
//! freely. Board entries are kept as raw JSON values at the top level so
//! that a single malformed entry can be skipped without rejecting the board.

use serde::{Deserialize, Deserializer};

/// Response from `/stationboard`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationBoardResponse {
    /// Board entries in departure order. Missing or `null` means none.
    #[serde(default)]
    pub stationboard: Option<Vec<serde_json::Value>>,
}

/// One entry on the station board.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JourneyDto {
    /// Journey name, e.g. "S 31".
    pub name: Option<String>,

    /// Category code, e.g. "S", "IR".
    pub category: Option<String>,

    /// Line number; sent as either a string or a number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub number: Option<String>,

    /// Destination name.
    pub to: Option<String>,

    /// Stop details at the board station.
    pub stop: Option<StopDto>,
}

/// Stop details of a journey at the board station.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopDto {
    /// Scheduled departure, e.g. "2024-03-15T10:45:00+0100".
    pub departure: Option<String>,

    /// Platform; sent as either a string or a number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub platform: Option<String>,

    /// Delay in minutes.
    pub delay: Option<i64>,
}

/// Response from `/locations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationsResponse {
    /// Candidate stations, best match first.
    #[serde(default)]
    pub stations: Option<Vec<LocationDto>>,
}

/// A candidate station from a location search.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LocationDto {
    /// Station id, e.g. "8507000". Missing for addresses and POIs.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,

    /// Station name.
    pub name: Option<String>,

    /// Distance in metres when searching by coordinates.
    pub distance: Option<f64>,
}

/// Accept `"31"`, `31` or `null` for a textual field.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Integer(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    }))
}
