//! Bounded retry for lookups that may legitimately come back empty.
//!
//! Only results judged retryable by the caller's predicate are retried.
//! Errors from the operation propagate on the spot.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::config::RetryConfig;

/// Default attempt budget (first call included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Duration::ZERO)
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self::new(cfg.max_attempts, Duration::from_millis(cfg.delay_ms))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Invoke `op` until `is_retryable` rejects its result or the budget
    /// runs out. The last result is returned either way.
    pub async fn run<T, F, Fut, P>(&self, mut op: F, is_retryable: P) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        P: Fn(&T) -> bool,
    {
        let mut attempt = 1;
        loop {
            let value = op().await?;
            if !is_retryable(&value) || attempt >= self.max_attempts {
                return Ok(value);
            }
            debug!(attempt, max_attempts = self.max_attempts, "Retryable result, trying again");
            attempt += 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }
    }

    /// Retry while `op` returns `Ok(None)`. `Ok(None)` after the last
    /// attempt means the budget was exhausted.
    pub async fn until_some<T, F, Fut>(&self, op: F) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        self.run(op, Option::is_none).await
    }
}
