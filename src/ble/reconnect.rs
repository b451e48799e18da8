//! Reconnect scheduling: capped exponential backoff.
//!
//! Pure decisions over caller-supplied monotonic timestamps - no
//! clock access, trivially unit-testable. The session never gives up;
//! after repeated failures it settles at the capped interval.

/// Mutable backoff state. Owned by the manager, persists for the life
/// of the session.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReconnectTimer {
    /// Monotonic timestamp of the last attempt (ms).
    pub last_attempt_ms: u64,
    /// Current wait before the next attempt (ms).
    pub interval_ms: u64,
}

impl ReconnectTimer {
    pub const fn new(base_ms: u64) -> Self {
        Self {
            last_attempt_ms: 0,
            interval_ms: base_ms,
        }
    }
}

/// Stateless backoff calculator.
#[derive(Clone, Copy, Debug)]
pub struct ReconnectPolicy {
    base_ms: u64,
    cap_ms: u64,
}

impl ReconnectPolicy {
    pub const fn new(base_ms: u64, cap_ms: u64) -> Self {
        Self { base_ms, cap_ms }
    }

    /// Is another attempt due at `now_ms`?
    pub fn should_retry(&self, now_ms: u64, timer: &ReconnectTimer) -> bool {
        now_ms.saturating_sub(timer.last_attempt_ms) >= timer.interval_ms
    }

    /// Interval to wait after an attempt: reset to base on success,
    /// double up to the cap on failure.
    pub fn next_interval(&self, current_ms: u64, succeeded: bool) -> u64 {
        if succeeded {
            self.base_ms
        } else {
            current_ms.saturating_mul(2).min(self.cap_ms)
        }
    }
}
