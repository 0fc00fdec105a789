//! Sensor value derived from a departure snapshot.
//!
//! The published value is the number of whole minutes until the first
//! departure on the board, rounded down. The full board is attached as
//! auxiliary attributes.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use super::departure::{Departure, DepartureSnapshot};

/// Unit of the sensor value.
pub const UNIT_MINUTES: &str = "min";

/// Whole minutes from `now` until `departure`, rounded towards negative
/// infinity (a departure 30 seconds ago is `-1`).
pub fn minutes_until(departure: DateTime<FixedOffset>, now: DateTime<Utc>) -> i64 {
    let millis = (departure.with_timezone(&Utc) - now).num_milliseconds();
    millis.div_euclid(60_000)
}

/// Minutes until the first departure in the snapshot.
///
/// Absent when the board is empty or its first departure has no usable time.
pub fn minutes_until_next(snapshot: &DepartureSnapshot, now: DateTime<Utc>) -> Option<i64> {
    let scheduled = snapshot.next_departure()?.scheduled_time?;
    Some(minutes_until(scheduled, now))
}

/// What a consumer displays for one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorState {
    /// Station identifier.
    pub station: String,

    /// False until the first successful refresh, and whenever the most
    /// recent refresh failed.
    pub available: bool,

    /// Minutes until the next departure.
    pub state: Option<i64>,

    /// Always [`UNIT_MINUTES`].
    pub unit: &'static str,

    /// The cached board, possibly stale when `available` is false.
    pub departures: Vec<Departure>,

    /// When the cached board was fetched.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl SensorState {
    /// Derive the sensor state from the cached snapshot.
    pub fn derive(
        station: &str,
        snapshot: Option<&DepartureSnapshot>,
        last_refresh_ok: bool,
        now: DateTime<Utc>,
    ) -> Self {
        match snapshot {
            Some(snapshot) => Self {
                station: station.to_string(),
                available: last_refresh_ok,
                state: minutes_until_next(snapshot, now),
                unit: UNIT_MINUTES,
                departures: snapshot.departures().to_vec(),
                fetched_at: Some(snapshot.fetched_at()),
            },
            None => Self {
                station: station.to_string(),
                available: false,
                state: None,
                unit: UNIT_MINUTES,
                departures: Vec::new(),
                fetched_at: None,
            },
        }
    }
}
