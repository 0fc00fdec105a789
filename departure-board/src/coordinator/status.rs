//! Outcome bookkeeping for refreshes.

use chrono::{DateTime, Utc};

use crate::opendata::FetchError;

/// What happened on the most recent refreshes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStatus {
    /// Whether the most recent refresh succeeded. False before any attempt.
    pub last_refresh_ok: bool,

    /// Message of the most recent failure, cleared on success.
    pub last_error: Option<String>,

    /// When the cached snapshot was fetched.
    pub last_success_at: Option<DateTime<Utc>>,

    /// Failures since the last success.
    pub consecutive_failures: u32,
}

impl RefreshStatus {
    /// Record a success. Returns true if this ends a run of failures.
    pub(crate) fn record_success(&mut self, at: DateTime<Utc>) -> bool {
        let recovered = self.consecutive_failures > 0;
        self.last_refresh_ok = true;
        self.last_error = None;
        self.last_success_at = Some(at);
        self.consecutive_failures = 0;
        recovered
    }

    /// Record a failure. Returns the number of failures in a row.
    pub(crate) fn record_failure(&mut self, err: &FetchError) -> u32 {
        self.last_refresh_ok = false;
        self.last_error = Some(err.to_string());
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }
}
