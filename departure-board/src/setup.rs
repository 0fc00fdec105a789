//! Station lookup performed once when a station is configured.
//!
//! Free text typed by the user ("bern", "Zurich HB") is resolved through
//! the API's location search to a concrete station. The first candidate
//! wins. [`configure_station`] then builds the station's coordinator, runs
//! its initial refresh and hands it to the registry.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::StationSettings;
use crate::coordinator::DepartureCoordinator;
use crate::domain::{DomainError, StationQuery};
use crate::opendata::{FetchError, LocationDto, TransportClient};
use crate::registry::{RegistryError, StationRegistry};

/// Errors from resolving a station.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Location search failed (network, HTTP status or body)
    #[error("cannot connect to the transport API: {0}")]
    CannotConnect(#[source] FetchError),

    /// Location search returned no candidates
    #[error("no station found for {0:?}")]
    NotFound(String),

    /// The resolved station cannot form a valid query
    #[error(transparent)]
    Invalid(#[from] DomainError),

    /// The station resolved to one that is already polled
    #[error(transparent)]
    Duplicate(#[from] RegistryError),
}

/// A station chosen from location search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStation {
    /// Stable id used to detect a station configured twice.
    pub unique_id: String,

    /// Display name.
    pub title: String,

    /// Query the coordinator will poll with.
    pub query: StationQuery,
}

/// Resolve free text to a station via the location search endpoint.
pub async fn resolve_station(
    client: &TransportClient,
    text: &str,
    limit: u32,
) -> Result<ResolvedStation, SetupError> {
    let candidates = client
        .search_locations(text)
        .await
        .map_err(SetupError::CannotConnect)?;

    pick_station(text, limit, candidates)
}

/// Choose the first candidate.
///
/// The query uses the candidate's name, which the board endpoint accepts.
/// Missing names or ids fall back to the user's text.
pub fn pick_station(
    text: &str,
    limit: u32,
    candidates: Vec<LocationDto>,
) -> Result<ResolvedStation, SetupError> {
    let first = candidates
        .into_iter()
        .next()
        .ok_or_else(|| SetupError::NotFound(text.to_string()))?;

    let name = first.name.filter(|n| !n.trim().is_empty());
    let unique_id = first
        .id
        .filter(|id| !id.trim().is_empty())
        .or_else(|| name.clone())
        .unwrap_or_else(|| text.trim().to_string());
    let title = name.clone().unwrap_or_else(|| text.trim().to_string());
    let query = StationQuery::new(name.unwrap_or_else(|| text.to_string()), limit)?;

    Ok(ResolvedStation {
        unique_id,
        title,
        query,
    })
}

/// Set up polling for one configured station.
///
/// Resolves the station (unless disabled), runs the initial refresh, registers
/// the coordinator and starts its loop. A failed initial refresh is logged
/// but does not abort setup: the coordinator stays uninitialized until a
/// scheduled refresh succeeds.
pub async fn configure_station(
    client: &TransportClient,
    registry: &StationRegistry,
    settings: &StationSettings,
) -> Result<DepartureCoordinator, SetupError> {
    let resolved = if settings.resolve {
        resolve_station(client, &settings.station, settings.limit).await?
    } else {
        let query = settings.query()?;
        ResolvedStation {
            unique_id: query.station().to_string(),
            title: query.station().to_string(),
            query,
        }
    };

    if registry.contains(&resolved.unique_id).await {
        return Err(RegistryError::AlreadyConfigured(resolved.unique_id).into());
    }

    let coordinator = DepartureCoordinator::new(
        Arc::new(client.clone()),
        resolved.query,
        settings.refresh_interval(),
    );

    match coordinator.refresh_now().await {
        Ok(snapshot) => info!(
            station = coordinator.station(),
            title = %resolved.title,
            departures = snapshot.len(),
            "station configured"
        ),
        Err(e) => warn!(
            station = coordinator.station(),
            error = %e,
            "initial refresh failed, retrying on schedule"
        ),
    }

    registry
        .insert(resolved.unique_id, coordinator.clone())
        .await?;
    coordinator.start();

    Ok(coordinator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(id: Option<&str>, name: Option<&str>) -> LocationDto {
        LocationDto {
            id: id.map(str::to_string),
            name: name.map(str::to_string),
            distance: None,
        }
    }

    #[test]
    fn picks_first_candidate() {
        let resolved = pick_station(
            "bern",
            5,
            vec![
                location(Some("8507000"), Some("Bern")),
                location(Some("8507100"), Some("Bern Wankdorf")),
            ],
        )
        .unwrap();

        assert_eq!(resolved.unique_id, "8507000");
        assert_eq!(resolved.title, "Bern");
        assert_eq!(resolved.query.station(), "Bern");
        assert_eq!(resolved.query.limit(), 5);
    }

    #[test]
    fn no_candidates_is_not_found() {
        let err = pick_station("atlantis", 5, Vec::new()).unwrap_err();
        assert!(matches!(err, SetupError::NotFound(text) if text == "atlantis"));
    }

    #[test]
    fn missing_id_uses_name() {
        let resolved = pick_station("olten", 5, vec![location(None, Some("Olten"))]).unwrap();
        assert_eq!(resolved.unique_id, "Olten");
    }

    #[test]
    fn missing_name_uses_text() {
        let resolved = pick_station("Thun", 4, vec![location(Some("8507500"), None)]).unwrap();
        assert_eq!(resolved.unique_id, "8507500");
        assert_eq!(resolved.title, "Thun");
        assert_eq!(resolved.query.station(), "Thun");
    }

    #[test]
    fn zero_limit_is_invalid() {
        let err = pick_station("bern", 0, vec![location(Some("1"), Some("Bern"))]).unwrap_err();
        assert!(matches!(err, SetupError::Invalid(DomainError::ZeroLimit)));
    }
}
