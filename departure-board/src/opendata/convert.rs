//! Conversion from transport API DTOs to domain types.
//!
//! Parsing is lenient at the entry level: a missing field becomes `None`
//! on the departure, and an entry whose fields have the wrong JSON types
//! is logged and skipped. Only a body that is not a JSON object at all
//! fails the whole board.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use tracing::{debug, warn};

use crate::domain::Departure;

use super::error::FetchError;
use super::types::{JourneyDto, StationBoardResponse};

/// Parse a `/stationboard` body into departures, in board order.
pub fn parse_station_board(body: &str) -> Result<Vec<Departure>, FetchError> {
    let board: StationBoardResponse =
        serde_json::from_str(body).map_err(|e| FetchError::parse(e, body))?;

    let entries = board.stationboard.unwrap_or_default();
    let mut departures = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<JourneyDto>(entry) {
            Ok(journey) => departures.push(convert_journey(journey)),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed stationboard entry");
            }
        }
    }

    Ok(departures)
}

/// Convert a single board entry.
pub fn convert_journey(journey: JourneyDto) -> Departure {
    let stop = journey.stop.unwrap_or_default();

    let scheduled_time = stop.departure.as_deref().and_then(|raw| {
        let parsed = parse_departure_time(raw);
        if parsed.is_none() {
            debug!(raw, "unparseable departure time");
        }
        parsed
    });

    Departure {
        name: journey.name,
        category: journey.category,
        number: journey.number,
        destination: journey.to,
        scheduled_time,
        platform: stop.platform,
        delay_minutes: stop.delay,
    }
}

/// Parse a departure timestamp.
///
/// Accepts RFC 3339, the API's `2024-03-15T10:45:00+0100` form, and a
/// timestamp without offset, which is taken to be UTC.
pub fn parse_departure_time(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time);
    }

    if let Ok(time) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(time);
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn entry_strategy() -> impl Strategy<Value = (String, Option<i64>, Option<u32>)> {
        (
            "[A-Z]{1,3} [0-9]{1,3}",
            proptest::option::of(-5i64..120),
            proptest::option::of(0u32..24 * 60),
        )
    }

    fn entry_json(name: &str, delay: Option<i64>, minute_of_day: Option<u32>) -> serde_json::Value {
        let mut stop = serde_json::Map::new();
        if let Some(delay) = delay {
            stop.insert("delay".into(), delay.into());
        }
        if let Some(m) = minute_of_day {
            stop.insert(
                "departure".into(),
                format!("2024-03-15T{:02}:{:02}:00+0100", m / 60, m % 60).into(),
            );
        }
        serde_json::json!({ "name": name, "stop": stop })
    }

    proptest! {
        #[test]
        fn preserves_count_and_order(entries in proptest::collection::vec(entry_strategy(), 0..40)) {
            let board: Vec<_> = entries
                .iter()
                .map(|(name, delay, minute)| entry_json(name, *delay, *minute))
                .collect();
            let body = serde_json::json!({ "stationboard": board }).to_string();

            let departures = parse_station_board(&body).unwrap();
            prop_assert_eq!(departures.len(), entries.len());

            for (departure, (name, delay, minute)) in departures.iter().zip(&entries) {
                prop_assert_eq!(departure.name.as_deref(), Some(name.as_str()));
                prop_assert_eq!(departure.delay_minutes, *delay);
                prop_assert_eq!(departure.scheduled_time.is_some(), minute.is_some());
            }
        }

        #[test]
        fn never_panics_on_arbitrary_text(body in ".{0,200}") {
            let _ = parse_station_board(&body);
        }
    }
}
