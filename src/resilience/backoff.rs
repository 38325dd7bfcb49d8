//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::WebhookConfig;

/// Delay schedule for retrying an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    /// Delay before retry number `attempt` (1-based). Attempt 0 has no delay.
    ///
    /// The delay doubles per attempt, is capped at `max_ms`, and gets up to
    /// 10% of jitter added on top.
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let factor = 2u64.saturating_pow(attempt - 1);
        let capped = self.base_ms.saturating_mul(factor).min(self.max_ms);

        let jitter_range = capped / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };

        Duration::from_millis(capped.saturating_add(jitter))
    }
}

impl From<&WebhookConfig> for Backoff {
    fn from(config: &WebhookConfig) -> Self {
        Self::new(config.base_delay_ms, config.max_delay_ms)
    }
}
