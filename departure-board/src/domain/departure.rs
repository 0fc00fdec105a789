//! Departures and departure snapshots.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// One upcoming run leaving the station.
///
/// Every field is optional because the transport API does not guarantee
/// any of them. A departure has no identity beyond its position in the
/// board returned by the API.
///
/// Serializes with the API's own field names (`to`, `stop`, `delay`) so
/// that consumers written against the raw board keep working.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Departure {
    /// Journey name, e.g. "S 31".
    pub name: Option<String>,

    /// Category code, e.g. "S", "IC", "B".
    pub category: Option<String>,

    /// Line number within the category.
    pub number: Option<String>,

    /// Final destination of the run.
    #[serde(rename = "to")]
    pub destination: Option<String>,

    /// Scheduled departure from this station.
    #[serde(rename = "stop")]
    pub scheduled_time: Option<DateTime<FixedOffset>>,

    /// Platform (may include sector letters, e.g. "7AB").
    pub platform: Option<String>,

    /// Announced delay in minutes.
    #[serde(rename = "delay")]
    pub delay_minutes: Option<i64>,
}

/// The complete set of known upcoming departures for one station at one
/// point in time.
///
/// Immutable once built. A successful refresh replaces the whole snapshot;
/// nothing is merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureSnapshot {
    station: String,
    departures: Vec<Departure>,
    fetched_at: DateTime<Utc>,
}

impl DepartureSnapshot {
    /// Build a snapshot. `departures` must already be in board order.
    pub fn new(
        station: impl Into<String>,
        departures: Vec<Departure>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            station: station.into(),
            departures,
            fetched_at,
        }
    }

    /// Station identifier this snapshot was fetched for.
    pub fn station(&self) -> &str {
        &self.station
    }

    /// Departures in the order the API returned them.
    pub fn departures(&self) -> &[Departure] {
        &self.departures
    }

    /// The first departure on the board, if any.
    pub fn next_departure(&self) -> Option<&Departure> {
        self.departures.first()
    }

    /// When the board was fetched.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.departures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departures.is_empty()
    }
}
