//! Shared retry policy
//!
//! One value object used identically by the chat router's last-resort tier
//! and by speech synthesis. Callers supply the predicate that separates
//! retryable from fatal errors.

use std::future::Future;
use std::time::Duration;

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Backoff multiplier applied per further attempt
    pub multiplier: u32,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration, multiplier: u32) -> Self {
        Self {
            max_attempts,
            base_delay,
            multiplier,
        }
    }

    /// Speech synthesis default: 3 attempts, 1s then 2s between them
    pub const fn synthesis() -> Self {
        Self::new(3, Duration::from_secs(1), 2)
    }

    /// Chat router last-resort tier: one immediate retry, one more after 10s
    pub const fn last_resort() -> Self {
        Self::new(2, Duration::from_secs(10), 2)
    }

    /// Delay before attempt `attempt` (1-based; attempt 1 has no delay)
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        self.base_delay * self.multiplier.pow(attempt - 2)
    }

    /// Run `op` under this policy. Sleeps between attempts; stops early on
    /// the first error `is_retryable` rejects, returning it unchanged.
    pub async fn run<T, E, Op, Fut, P>(&self, is_retryable: P, mut op: Op) -> Result<T, E>
    where
        Op: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let mut last_err = None;
        for attempt in 1..=self.max_attempts.max(1) {
            let delay = self.delay_before(attempt);
            if !delay.is_zero() {
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying");
                tokio::time::sleep(delay).await;
            }
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) => last_err = Some(e),
                Err(e) => return Err(e),
            }
        }
        // max_attempts >= 1, so at least one attempt ran and set last_err
        Err(last_err.expect("retry loop ran at least once"))
    }
}
