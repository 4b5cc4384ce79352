//! Poll cadence for the job waiter
//!
//! Successive polls back off exponentially from a small initial delay up to
//! a cap, so a long wait never busy-spins against the job API.

use std::time::Duration;

/// Floor for every computed delay; a zero or sub-millisecond setting would
/// otherwise poll in a tight loop.
pub const MIN_POLL_DELAY: Duration = Duration::from_millis(10);

/// Configuration for poll backoff
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay after the first poll
    pub initial_delay: Duration,
    /// Maximum delay between two polls
    pub max_delay: Duration,
    /// Multiplier applied after every poll
    pub backoff_multiplier: f64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl PollPolicy {
    /// Constant cadence, mostly useful in tests
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
            backoff_multiplier: 1.0,
        }
    }

    /// Delay to wait after poll number `attempt` (zero-based), never below
    /// [`MIN_POLL_DELAY`]
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        self.raw_delay(attempt).max(MIN_POLL_DELAY)
    }

    fn raw_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let multiplier = self.backoff_multiplier.max(1.0).powi(exponent);
        let millis = self.initial_delay.as_millis() as f64 * multiplier;

        if !millis.is_finite() || millis >= self.max_delay.as_millis() as f64 {
            return self.max_delay;
        }

        Duration::from_millis(millis as u64).min(self.max_delay)
    }
}
