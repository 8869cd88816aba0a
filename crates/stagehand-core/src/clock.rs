//! Clock abstraction for determinism.
//!
//! Every timer the playback engine schedules is expressed as an absolute
//! deadline read from a `Clock`, so tests can drive time by hand.

use chrono::{DateTime, TimeDelta, Utc};

/// Abstraction over system time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the instant `delay_ms` milliseconds from now.
    fn deadline_after(&self, delay_ms: u64) -> DateTime<Utc> {
        offset_by(self.now(), delay_ms)
    }
}

/// `at` plus `delay_ms` milliseconds, saturating at the latest
/// representable instant.
#[must_use]
pub fn offset_by(at: DateTime<Utc>, delay_ms: u64) -> DateTime<Utc> {
    i64::try_from(delay_ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .and_then(|delay| at.checked_add_signed(delay))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
