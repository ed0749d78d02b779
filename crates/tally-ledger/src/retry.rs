//! # Conflict Retry
//!
//! Write operations are pure functions of what they read inside their own
//! transaction, so a `Conflict` (stock version moved, SQLite busy) is safe
//! to answer by running the whole operation again. Domain errors are
//! returned on the first attempt.

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::LedgerResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first.
    pub max_retries: u32,
    /// Sleep before the first retry, roughly doubled each time.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        RetryPolicy {
            max_retries,
            backoff,
        }
    }

    /// Fail on the first conflict.
    pub fn none() -> Self {
        RetryPolicy::new(0, Duration::ZERO)
    }

    /// Jittered exponential schedule starting at `backoff`, capped at 64x.
    fn schedule(&self) -> ExponentialBackoff {
        let mut schedule = ExponentialBackoff {
            initial_interval: self.backoff,
            max_interval: self.backoff.saturating_mul(64),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        };
        schedule.reset();
        schedule
    }

    /// Runs `op` until it succeeds, fails with a non-conflict error, or the
    /// retry budget is spent.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut op: F) -> LedgerResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = LedgerResult<T>>,
    {
        let mut schedule = self.schedule();
        let mut attempt = 0;
        loop {
            match op().await {
                Err(err) if err.is_conflict() && attempt < self.max_retries => {
                    let delay = schedule.next_backoff().unwrap_or(self.backoff);
                    attempt += 1;
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        reason = %err.message,
                        "Write conflict, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(5, Duration::from_millis(20))
    }
}
