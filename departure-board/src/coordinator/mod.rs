//! Periodic-refresh departure coordinator.
//!
//! A [`DepartureCoordinator`] owns one station query, fetches its board on a
//! fixed interval, caches the latest [`DepartureSnapshot`](crate::domain::DepartureSnapshot)
//! and notifies subscribers after every successful refresh.
//!
//! Failures never touch the cache: readers keep seeing the last good board
//! until a refresh succeeds again. Refreshes for one coordinator never run
//! concurrently.

mod listeners;
mod refresh;
mod schedule;
mod source;
mod status;

pub use listeners::Subscription;
pub use refresh::{CoordinatorState, DEFAULT_REFRESH_INTERVAL, DepartureCoordinator};
pub use source::DepartureSource;
pub use status::RefreshStatus;
