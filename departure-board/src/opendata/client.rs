//! transport.opendata.ch HTTP client.
//!
//! Provides async methods for fetching station boards and searching for
//! stations. Query values are always URL-encoded, so station names with
//! spaces, commas or `&` reach the API intact.

use std::time::Duration;

use reqwest::Url;

use crate::domain::{Departure, StationQuery};

use super::convert::parse_station_board;
use super::error::{ClientError, FetchError};
use super::types::{LocationDto, LocationsResponse};

/// Default base URL for the transport API.
const DEFAULT_BASE_URL: &str = "https://transport.opendata.ch/v1";

/// Default timeout for departure board requests.
const DEFAULT_BOARD_TIMEOUT_SECS: u64 = 30;

/// Default timeout for station search requests.
const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 15;

/// Configuration for the transport client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL for the API (defaults to the public production API)
    pub base_url: String,
    /// Timeout for `/stationboard` requests in seconds
    pub board_timeout_secs: u64,
    /// Timeout for `/locations` requests in seconds
    pub lookup_timeout_secs: u64,
}

impl TransportConfig {
    /// Create a config pointing at the public API.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            board_timeout_secs: DEFAULT_BOARD_TIMEOUT_SECS,
            lookup_timeout_secs: DEFAULT_LOOKUP_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the departure board timeout.
    pub fn with_board_timeout(mut self, secs: u64) -> Self {
        self.board_timeout_secs = secs;
        self
    }

    /// Set the station search timeout.
    pub fn with_lookup_timeout(mut self, secs: u64) -> Self {
        self.lookup_timeout_secs = secs;
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Client for the transport API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TransportClient {
    http: reqwest::Client,
    board_endpoint: Url,
    locations_endpoint: Url,
    board_timeout: Duration,
    lookup_timeout: Duration,
}

impl TransportClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self, ClientError> {
        let base = config.base_url.trim_end_matches('/');
        let endpoint = |path: &str| {
            Url::parse(&format!("{base}/{path}")).map_err(|e| ClientError::InvalidBaseUrl {
                url: config.base_url.clone(),
                message: e.to_string(),
            })
        };

        let board_endpoint = endpoint("stationboard")?;
        let locations_endpoint = endpoint("locations")?;

        let http = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            http,
            board_endpoint,
            locations_endpoint,
            board_timeout: Duration::from_secs(config.board_timeout_secs),
            lookup_timeout: Duration::from_secs(config.lookup_timeout_secs),
        })
    }

    /// URL of the departure board for a query.
    pub fn stationboard_url(&self, query: &StationQuery) -> Url {
        let mut url = self.board_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("station", query.station())
            .append_pair("limit", &query.limit().to_string());
        url
    }

    /// URL of a station search.
    pub fn locations_url(&self, text: &str) -> Url {
        let mut url = self.locations_endpoint.clone();
        url.query_pairs_mut().append_pair("query", text);
        url
    }

    /// Fetch and parse the departure board for a station.
    pub async fn fetch_stationboard(
        &self,
        query: &StationQuery,
    ) -> Result<Vec<Departure>, FetchError> {
        let body = self
            .get_text(self.stationboard_url(query), self.board_timeout)
            .await?;

        parse_station_board(&body)
    }

    /// Search for stations matching free text, best match first.
    pub async fn search_locations(&self, text: &str) -> Result<Vec<LocationDto>, FetchError> {
        let body = self
            .get_text(self.locations_url(text), self.lookup_timeout)
            .await?;

        let response: LocationsResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::parse(e, &body))?;

        Ok(response.stations.unwrap_or_default())
    }

    /// GET a URL and return the body of a 2xx response.
    async fn get_text(&self, url: Url, timeout: Duration) -> Result<String, FetchError> {
        let response = self.http.get(url).timeout(timeout).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Remote {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
