//! Time-gated cancellation rule.

use chrono::{DateTime, Duration, Utc};

/// Default minimum notice for a cancellation.
pub const DEFAULT_CANCELLATION_WINDOW_HOURS: i64 = 3;

/// Longest configurable notice, one year.
pub const MAX_CANCELLATION_WINDOW_HOURS: i64 = 24 * 365;

/// A booking may be cancelled only while strictly more than `window` remains
/// before the appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancellationPolicy {
    window: Duration,
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self::from_hours(DEFAULT_CANCELLATION_WINDOW_HOURS)
    }
}

impl CancellationPolicy {
    /// Builds a policy, clamping `hours` into `0..=MAX_CANCELLATION_WINDOW_HOURS`.
    #[must_use]
    pub fn from_hours(hours: i64) -> Self {
        Self {
            window: Duration::hours(hours.clamp(0, MAX_CANCELLATION_WINDOW_HOURS)),
        }
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// First instant at which cancelling is no longer allowed.
    #[must_use]
    pub fn cutoff(&self, appointment: DateTime<Utc>) -> DateTime<Utc> {
        appointment - self.window
    }

    #[must_use]
    pub fn allows(&self, now: DateTime<Utc>, appointment: DateTime<Utc>) -> bool {
        now < self.cutoff(appointment)
    }
}
