//! transport.opendata.ch client.
//!
//! This module provides an HTTP client for the Swiss public transport API,
//! which serves live departure boards and a station search.
//!
//! Key characteristics of the API:
//! - Departure boards are keyed by a free-form station identifier (name or id)
//! - Times are ISO 8601 with a `+HHMM` offset (no colon)
//! - Any field of a board entry may be missing or `null`

mod client;
mod convert;
mod error;
mod types;

pub use client::{TransportClient, TransportConfig};
pub use convert::{convert_journey, parse_departure_time, parse_station_board};
pub use error::{ClientError, FetchError, FetchErrorKind};
pub use types::{JourneyDto, LocationDto, LocationsResponse, StationBoardResponse, StopDto};
