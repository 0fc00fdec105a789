//! Per-station coordinator ownership.
//!
//! The process owns one [`StationRegistry`]; each configured station gets
//! exactly one coordinator in it, keyed by the station's unique id.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::coordinator::DepartureCoordinator;

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A coordinator is already registered under this id
    #[error("station {0} is already configured")]
    AlreadyConfigured(String),
}

/// Thread-safe map from station id to coordinator.
#[derive(Clone, Default)]
pub struct StationRegistry {
    inner: Arc<RwLock<BTreeMap<String, DepartureCoordinator>>>,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a coordinator. Fails if `id` is already taken.
    pub async fn insert(
        &self,
        id: impl Into<String>,
        coordinator: DepartureCoordinator,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        let mut guard = self.inner.write().await;

        if guard.contains_key(&id) {
            return Err(RegistryError::AlreadyConfigured(id));
        }

        guard.insert(id, coordinator);
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Option<DepartureCoordinator> {
        self.inner.read().await.get(id).cloned()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.inner.read().await.contains_key(id)
    }

    /// Unregister a coordinator and stop its refresh loop.
    pub async fn remove(&self, id: &str) -> Option<DepartureCoordinator> {
        let removed = self.inner.write().await.remove(id);
        if let Some(coordinator) = &removed {
            coordinator.stop().await;
        }
        removed
    }

    /// All registered ids, sorted.
    pub async fn ids(&self) -> Vec<String> {
        self.inner.read().await.keys().cloned().collect()
    }

    /// All registered coordinators, sorted by id.
    pub async fn entries(&self) -> Vec<(String, DepartureCoordinator)> {
        self.inner
            .read()
            .await
            .iter()
            .map(|(id, c)| (id.clone(), c.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Stop every coordinator's refresh loop. Coordinators stay registered
    /// so their last snapshots remain readable.
    pub async fn shutdown(&self) {
        for (_, coordinator) in self.entries().await {
            coordinator.stop().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::DepartureSource;
    use crate::domain::{Departure, StationQuery};
    use crate::opendata::FetchError;
    use futures::future::BoxFuture;
    use std::time::Duration;

    struct EmptySource;

    impl DepartureSource for EmptySource {
        fn fetch_departures<'a>(
            &'a self,
            _query: &'a StationQuery,
        ) -> BoxFuture<'a, Result<Vec<Departure>, FetchError>> {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    fn coordinator(station: &str) -> DepartureCoordinator {
        DepartureCoordinator::new(
            Arc::new(EmptySource),
            StationQuery::new(station, 5).unwrap(),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn insert_and_get() {
        let registry = StationRegistry::new();
        registry.insert("8507000", coordinator("Bern")).await.unwrap();

        let found = registry.get("8507000").await.unwrap();
        assert_eq!(found.station(), "Bern");
        assert!(registry.get("8503000").await.is_none());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn rejects_duplicate_id() {
        let registry = StationRegistry::new();
        registry.insert("8507000", coordinator("Bern")).await.unwrap();

        let err = registry
            .insert("8507000", coordinator("Bern Bahnhof"))
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::AlreadyConfigured("8507000".into()));
        assert_eq!(registry.get("8507000").await.unwrap().station(), "Bern");
    }

    #[tokio::test]
    async fn ids_are_sorted() {
        let registry = StationRegistry::new();
        registry.insert("thun", coordinator("Thun")).await.unwrap();
        registry.insert("bern", coordinator("Bern")).await.unwrap();
        registry.insert("olten", coordinator("Olten")).await.unwrap();

        assert_eq!(registry.ids().await, ["bern", "olten", "thun"]);
    }

    #[tokio::test]
    async fn remove_stops_loop() {
        let registry = StationRegistry::new();
        let c = coordinator("Bern");
        c.start();
        registry.insert("bern", c.clone()).await.unwrap();

        let removed = registry.remove("bern").await.unwrap();
        assert!(!removed.is_running());
        assert!(!c.is_running());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn shutdown_stops_all_but_keeps_entries() {
        let registry = StationRegistry::new();
        for station in ["Bern", "Thun"] {
            let c = coordinator(station);
            c.start();
            registry.insert(station, c).await.unwrap();
        }

        registry.shutdown().await;

        for (_, c) in registry.entries().await {
            assert!(!c.is_running());
        }
        assert_eq!(registry.len().await, 2);
    }
}
