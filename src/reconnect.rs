//! Backoff policy for push-channel reconnection.

use std::time::Duration;

/// Pure backoff schedule: exponential delay with a cap, and a ceiling on the
/// number of attempts.
///
/// Attempts are numbered from 1. `delay(n)` yields the pause before attempt
/// `n`; past `max_attempts` it yields `None` and the caller must stop
/// scheduling. Only a fresh channel open starts the count over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnection attempt.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Number of consecutive failures tolerated before giving up.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnection attempt `attempt` (1-based), or `None` once
    /// the attempt ceiling is exhausted.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let shift = (attempt - 1).min(31);
        let delay = self.base_delay.saturating_mul(1u32 << shift);
        Some(delay.min(self.max_delay))
    }
}
