//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::BlockPollConfig;

/// Capped exponential delay schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    /// Delay before poll number `attempt` (1-based). Attempt 0 is immediate.
    pub fn delay(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_ms, self.max_ms)
    }
}

impl From<&BlockPollConfig> for Backoff {
    fn from(config: &BlockPollConfig) -> Self {
        Self::new(config.initial_delay_ms, config.max_delay_ms)
    }
}

/// Calculate exponential backoff delay with jitter.
///
/// The delay doubles per attempt from `base_ms`, is capped at `max_ms`, and
/// gets up to 10% of jitter on top.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 2u64.saturating_pow(attempt - 1);
    let capped = base_ms.saturating_mul(factor).min(max_ms);

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}
