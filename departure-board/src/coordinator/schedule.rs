//! Background refresh loop.

use std::sync::Weak;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::refresh::{DepartureCoordinator, Inner};

/// Refresh on a fixed period until cancelled or the coordinator is dropped.
///
/// Each tick is independent: a failed refresh is logged and the schedule
/// carries on. A tick that comes due while a refresh is still in flight
/// is skipped.
pub(super) async fn run_refresh_loop(
    inner: Weak<Inner>,
    shutdown: CancellationToken,
    period: Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // First tick is immediate, skip it

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {}
        }

        let Some(inner) = inner.upgrade() else {
            break;
        };
        let coordinator = DepartureCoordinator { inner };

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tick(&coordinator) => {}
        }
    }

    debug!("refresh loop stopped");
}

async fn tick(coordinator: &DepartureCoordinator) {
    let station = coordinator.station();

    match coordinator.refresh_if_idle().await {
        None => debug!(station, "refresh still in flight, skipping tick"),
        Some(Ok(_)) => {}
        Some(Err(e)) => {
            let failures = coordinator.status().await.consecutive_failures;
            if failures <= 1 {
                warn!(station, error = %e, "error fetching departures");
            } else {
                debug!(station, failures, error = %e, "departure fetch still failing");
            }
        }
    }
}
