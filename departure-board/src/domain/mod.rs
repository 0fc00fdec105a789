//! Core domain types for departure boards.
//!
//! These types are independent of the transport API's wire format: the
//! `opendata` module converts raw responses into them, and everything
//! downstream (coordinator, sensor, web) only sees these.

mod departure;
mod error;
mod query;
mod sensor;

pub use departure::{Departure, DepartureSnapshot};
pub use error::DomainError;
pub use query::{DEFAULT_LIMIT, StationQuery};
pub use sensor::{SensorState, UNIT_MINUTES, minutes_until, minutes_until_next};
