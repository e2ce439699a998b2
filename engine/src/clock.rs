//! # Clock Collaborator
//!
//! Expiry is the only time-dependent rule in the engine, and it needs to
//! be testable without sleeping for 24 hours. All reads of "now" go
//! through the [`Clock`] trait: production uses [`SystemClock`], tests
//! use [`ManualClock`] and advance it explicitly.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Monotonic wall-clock source.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for tests and deterministic replay.
///
/// Cloning shares the underlying instant: advance one handle and every
/// clone sees the new time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    instant: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Starts the clock at the given instant.
    pub fn starting_at(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Arc::new(Mutex::new(instant)),
        }
    }

    /// Moves the clock forward. Never backward — expiry assumes
    /// monotonicity.
    pub fn advance(&self, by: Duration) {
        let mut instant = self.instant.lock();
        *instant = *instant + by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_all_clones() {
        let clock = ManualClock::default();
        let clone = clock.clone();
        let before = clock.now();
        clock.advance(Duration::hours(3));
        assert_eq!(clone.now(), before + Duration::hours(3));
    }
}
