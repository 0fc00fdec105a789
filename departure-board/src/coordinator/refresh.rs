//! The departure coordinator.

use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::domain::{DepartureSnapshot, SensorState, StationQuery};
use crate::opendata::FetchError;

use super::listeners::{Listeners, Subscription};
use super::schedule::run_refresh_loop;
use super::source::DepartureSource;
use super::status::RefreshStatus;

/// Refresh period used when none is configured.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Shortest accepted refresh period; `tokio::time::interval` rejects zero.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// Whether a coordinator has ever produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No refresh has succeeded yet.
    Uninitialized,
    /// A snapshot is cached (possibly stale).
    Ready,
}

/// Cached board plus the bookkeeping that must change with it.
#[derive(Default)]
struct Cache {
    snapshot: Option<Arc<DepartureSnapshot>>,
    status: RefreshStatus,
}

pub(super) struct Inner {
    query: StationQuery,
    refresh_interval: Duration,
    source: Arc<dyn DepartureSource>,

    /// Only written while `in_flight` is held; the write lock is held just
    /// long enough to swap values, so readers never wait on the network.
    cache: RwLock<Cache>,

    /// Held for the whole fetch-parse-publish cycle.
    in_flight: Mutex<()>,

    listeners: Arc<Listeners>,
    shutdown: CancellationToken,
    task: StdMutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Fetches, caches and publishes the departure board of one station.
///
/// Cheap to clone; clones share the same cache, subscribers and loop.
/// Coordinators for different stations share nothing.
#[derive(Clone)]
pub struct DepartureCoordinator {
    pub(super) inner: Arc<Inner>,
}

impl DepartureCoordinator {
    /// Create a coordinator for one station. Does not touch the network.
    pub fn new(
        source: Arc<dyn DepartureSource>,
        query: StationQuery,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                query,
                refresh_interval: refresh_interval.max(MIN_REFRESH_INTERVAL),
                source,
                cache: RwLock::new(Cache::default()),
                in_flight: Mutex::new(()),
                listeners: Arc::new(Listeners::default()),
                shutdown: CancellationToken::new(),
                task: StdMutex::new(None),
            }),
        }
    }

    pub fn query(&self) -> &StationQuery {
        &self.inner.query
    }

    pub fn station(&self) -> &str {
        self.inner.query.station()
    }

    pub fn refresh_interval(&self) -> Duration {
        self.inner.refresh_interval
    }

    /// Run one fetch-parse-publish cycle.
    ///
    /// If another refresh is in flight this waits for it to finish first,
    /// so two fetches for the same station never overlap. On failure the
    /// cached snapshot is left as it was and the error is returned.
    pub async fn refresh_now(&self) -> Result<Arc<DepartureSnapshot>, FetchError> {
        let _guard = self.inner.in_flight.lock().await;
        self.refresh_locked().await
    }

    /// Like [`refresh_now`](Self::refresh_now), but returns `None` without
    /// fetching if a refresh is already in flight.
    pub async fn refresh_if_idle(&self) -> Option<Result<Arc<DepartureSnapshot>, FetchError>> {
        let _guard = self.inner.in_flight.try_lock().ok()?;
        Some(self.refresh_locked().await)
    }

    async fn refresh_locked(&self) -> Result<Arc<DepartureSnapshot>, FetchError> {
        let station = self.station();
        let result = self.inner.source.fetch_departures(&self.inner.query).await;

        let mut cache = self.inner.cache.write().await;
        match result {
            Ok(departures) => {
                let snapshot = Arc::new(DepartureSnapshot::new(station, departures, Utc::now()));
                cache.snapshot = Some(snapshot.clone());
                let recovered = cache.status.record_success(snapshot.fetched_at());
                drop(cache);

                if recovered {
                    info!(station, "departure fetch recovered");
                }
                debug!(station, departures = snapshot.len(), "departures refreshed");

                self.inner.listeners.notify(&snapshot);
                Ok(snapshot)
            }
            Err(e) => {
                cache.status.record_failure(&e);
                Err(e)
            }
        }
    }

    /// The last successfully fetched snapshot, if any.
    pub async fn cached_snapshot(&self) -> Option<Arc<DepartureSnapshot>> {
        self.inner.cache.read().await.snapshot.clone()
    }

    pub async fn status(&self) -> RefreshStatus {
        self.inner.cache.read().await.status.clone()
    }

    pub async fn state(&self) -> CoordinatorState {
        if self.inner.cache.read().await.snapshot.is_some() {
            CoordinatorState::Ready
        } else {
            CoordinatorState::Uninitialized
        }
    }

    /// Sensor view of the cache at `now`.
    pub async fn sensor_state(&self, now: DateTime<Utc>) -> SensorState {
        let cache = self.inner.cache.read().await;
        SensorState::derive(
            self.station(),
            cache.snapshot.as_deref(),
            cache.status.last_refresh_ok,
            now,
        )
    }

    /// Register a callback run after every successful refresh.
    ///
    /// The callback runs on the refreshing task and should return quickly.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<DepartureSnapshot>) + Send + Sync + 'static,
    {
        self.inner.listeners.add(Arc::new(listener))
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Spawn the background refresh loop on the current tokio runtime.
    ///
    /// The first refresh happens one interval from now; the initial refresh
    /// is the caller's job. Returns false if the loop is already running or
    /// the coordinator has been stopped.
    pub fn start(&self) -> bool {
        let mut task = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if task.is_some() || self.inner.shutdown.is_cancelled() {
            return false;
        }

        *task = Some(tokio::spawn(run_refresh_loop(
            Arc::downgrade(&self.inner),
            self.inner.shutdown.clone(),
            self.inner.refresh_interval,
        )));
        true
    }

    /// Whether the background loop is running.
    pub fn is_running(&self) -> bool {
        self.inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the background loop for good.
    ///
    /// A fetch in flight on the loop is abandoned; the cache keeps whatever
    /// it held. Manual [`refresh_now`](Self::refresh_now) calls still work.
    pub async fn stop(&self) {
        self.inner.shutdown.cancel();

        let handle = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle
            && let Err(e) = handle.await
            && e.is_panic()
        {
            error!(station = self.station(), "refresh loop panicked");
        }
    }
}

impl std::fmt::Debug for DepartureCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepartureCoordinator")
            .field("query", &self.inner.query)
            .field("refresh_interval", &self.inner.refresh_interval)
            .finish_non_exhaustive()
    }
}
