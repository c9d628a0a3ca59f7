//! AI gateway parameters: admission rate and retry policy.

use std::time::Duration;

/// Token-bucket parameters shared by every outbound AI call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// Tokens added per second
    pub rate: f64,
    /// Bucket size (burst)
    pub capacity: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rate: 0.25,
            capacity: 1.0,
        }
    }
}

/// Exponential backoff for rate-limited backend calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt + 1`: `base * 2^attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}
