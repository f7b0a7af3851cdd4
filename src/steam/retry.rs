//! Backoff and pacing shared by every store call site.

use super::error::FetchError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff policy: `min(base * 2^attempt, cap)` between attempts.
///
/// Pagination and detail lookups use different instances of this policy
/// rather than separate retry loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base: Duration,
    cap: Duration,
}

impl RetryPolicy {
    /// Creates a policy. `max_attempts` counts the first try and is at least 1.
    pub fn new(max_attempts: u32, base: Duration, cap: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base, cap }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay slept after the failed attempt with zero-based index `attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let multiplier = 2_u32.saturating_pow(attempt);
        self.base.saturating_mul(multiplier).min(self.cap)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. The last error is returned on exhaustion.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt + 1 < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    match err {
                        FetchError::RateLimited => warn!(
                            "Rate limited on {} (attempt {}/{}), waiting {:.1}s",
                            what,
                            attempt + 1,
                            self.max_attempts,
                            delay.as_secs_f64()
                        ),
                        _ => warn!(
                            "{} failed (attempt {}/{}): {}, retrying in {:.1}s",
                            what,
                            attempt + 1,
                            self.max_attempts,
                            err,
                            delay.as_secs_f64()
                        ),
                    }
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!("Giving up on {} after {} attempt(s): {}", what, attempt + 1, err);
                    return Err(err);
                }
            }
        }
    }
}

/// Fixed delay with optional random jitter, used to throttle the request rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pause {
    delay_ms: u64,
    jitter_ms: u64,
}

impl Pause {
    pub fn new(delay_ms: u64, jitter_ms: u64) -> Self {
        Self { delay_ms, jitter_ms }
    }

    fn jitter(&self) -> u64 {
        if self.jitter_ms > 0 {
            rand::rng().random_range(0..=self.jitter_ms)
        } else {
            0
        }
    }

    /// Sleeps for the configured delay plus `0..=jitter_ms`.
    pub async fn wait(&self) {
        if self.delay_ms == 0 && self.jitter_ms == 0 {
            return;
        }

        let total_delay = self.delay_ms + self.jitter();
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}
