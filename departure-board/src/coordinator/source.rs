//! Where departures come from.

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::domain::{Departure, StationQuery};
use crate::opendata::{FetchError, TransportClient};

/// Trait for fetching a station's departure board.
///
/// This abstraction allows the coordinator to be tested with scripted data.
/// Implementations return departures in board order.
pub trait DepartureSource: Send + Sync {
    fn fetch_departures<'a>(
        &'a self,
        query: &'a StationQuery,
    ) -> BoxFuture<'a, Result<Vec<Departure>, FetchError>>;
}

impl DepartureSource for TransportClient {
    fn fetch_departures<'a>(
        &'a self,
        query: &'a StationQuery,
    ) -> BoxFuture<'a, Result<Vec<Departure>, FetchError>> {
        self.fetch_stationboard(query).boxed()
    }
}
