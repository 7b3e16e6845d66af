//! Rate-limit backoff.

use std::time::Duration;

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(600);

/// Doubling delay shared by every call to the social API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.min(max);
        Self { base, max, current: base }
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    /// Double the delay (up to the maximum) and return it as the time to wait.
    pub fn on_rate_limit(&mut self) -> Duration {
        self.current = (self.current * 2).min(self.max);
        self.current
    }

    /// Back to the base delay after a successful call.
    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }
}
