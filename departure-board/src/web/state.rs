//! Application state for the web layer.

use crate::registry::StationRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Coordinators for every configured station
    pub registry: StationRegistry,
}

impl AppState {
    pub fn new(registry: StationRegistry) -> Self {
        Self { registry }
    }
}
