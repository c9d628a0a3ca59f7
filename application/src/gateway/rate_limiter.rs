//! Token-bucket admission control for outbound AI calls

use crate::config::RateLimitConfig;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, sleep};
use tracing::debug;

struct Bucket {
    tokens: f64,
    last_update: Instant,
}

/// Shared by every room; holds its own lock
///
/// A caller takes its token immediately, even if that drives the balance
/// negative, and then sleeps off the debt outside the lock. Callers are
/// therefore admitted in arrival order at `rate` per second after the
/// initial burst of `capacity`.
pub struct RateLimiter {
    rate: f64,
    capacity: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            rate: config.rate,
            capacity: config.capacity,
            bucket: Mutex::new(Bucket {
                tokens: config.capacity,
                last_update: Instant::now(),
            }),
        }
    }

    /// Wait until a call may be made
    pub async fn acquire(&self) {
        let wait = {
            let mut bucket = self.bucket.lock().await;
            let now = Instant::now();
            let elapsed = now.duration_since(bucket.last_update).as_secs_f64();
            bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.capacity);
            bucket.last_update = now;
            bucket.tokens -= 1.0;

            if bucket.tokens >= 0.0 {
                None
            } else {
                Some(Duration::from_secs_f64(-bucket.tokens / self.rate))
            }
        };

        if let Some(wait) = wait {
            debug!("Rate limiter: waiting {:?}", wait);
            sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(rate: f64, capacity: f64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig { rate, capacity })
    }

    fn assert_close(actual: Duration, expected_ms: u64) {
        let actual_ms = actual.as_millis() as i128;
        assert!(
            (actual_ms - expected_ms as i128).abs() <= 2,
            "expected ~{}ms, got {}ms",
            expected_ms,
            actual_ms
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_acquisitions_are_spaced() {
        let limiter = limiter(5.0, 1.0);
        let start = Instant::now();

        let mut offsets = Vec::new();
        for _ in 0..3 {
            limiter.acquire().await;
            offsets.push(start.elapsed());
        }

        assert_close(offsets[0], 0);
        assert_close(offsets[1], 200);
        assert_close(offsets[2], 400);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquisitions_queue_up() {
        let limiter = limiter(5.0, 1.0);
        let start = Instant::now();

        let (a, b, c) = tokio::join!(
            async {
                limiter.acquire().await;
                start.elapsed()
            },
            async {
                limiter.acquire().await;
                start.elapsed()
            },
            async {
                limiter.acquire().await;
                start.elapsed()
            },
        );

        let mut offsets = vec![a, b, c];
        offsets.sort();
        assert_close(offsets[0], 0);
        assert_close(offsets[1], 200);
        assert_close(offsets[2], 400);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_up_to_capacity() {
        let limiter = limiter(1.0, 3.0);
        let start = Instant::now();
        for _ in 0..3 {
            limiter.acquire().await;
        }
        assert_close(start.elapsed(), 0);

        limiter.acquire().await;
        assert_close(start.elapsed(), 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_is_capped() {
        let limiter = limiter(10.0, 1.0);
        tokio::time::sleep(Duration::from_secs(60)).await;

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert_close(start.elapsed(), 100);
    }
}
