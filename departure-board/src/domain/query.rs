//! Station query configuration.

use std::fmt;
use std::num::NonZeroU32;

use super::error::DomainError;

/// Number of departures requested when the user does not choose one.
pub const DEFAULT_LIMIT: u32 = 5;

/// The station and result limit a coordinator polls for.
///
/// Created once at setup time and never mutated. The station identifier is
/// opaque: it is whatever the transport API accepts (a name such as
/// `"Bern"` or a numeric id such as `"8507000"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StationQuery {
    station: String,
    limit: NonZeroU32,
}

impl StationQuery {
    /// Create a query, trimming surrounding whitespace from the station.
    pub fn new(station: impl Into<String>, limit: u32) -> Result<Self, DomainError> {
        let station = station.into();
        let station = station.trim();
        if station.is_empty() {
            return Err(DomainError::EmptyStation);
        }

        let limit = NonZeroU32::new(limit).ok_or(DomainError::ZeroLimit)?;

        Ok(Self {
            station: station.to_string(),
            limit,
        })
    }

    /// Create a query with [`DEFAULT_LIMIT`].
    pub fn with_default_limit(station: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(station, DEFAULT_LIMIT)
    }

    /// The station identifier as sent to the API.
    pub fn station(&self) -> &str {
        &self.station
    }

    /// Maximum number of departures to request.
    pub fn limit(&self) -> u32 {
        self.limit.get()
    }
}

impl fmt::Display for StationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (limit {})", self.station, self.limit)
    }
}
