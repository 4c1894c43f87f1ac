//! Bounded exponential backoff for upstream calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::duffel::DuffelError;

/// How often and how patiently to retry a failing upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero behaves like one.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 250,
            max_backoff_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_backoff(mut self, initial_ms: u64, max_ms: u64) -> Self {
        self.initial_backoff_ms = initial_ms;
        self.max_backoff_ms = max_ms;
        self
    }

    /// Delay before retry number `retry` (1-based): `initial * 2^(retry-1)`,
    /// capped at the maximum.
    pub fn backoff_ms(&self, retry: u32) -> u64 {
        let exponent = retry.saturating_sub(1).min(31);
        self.initial_backoff_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms)
    }

    /// Run `call` until it succeeds, fails permanently, or attempts run out.
    ///
    /// Only [`DuffelError::is_transient`] errors are retried.
    pub async fn run<T, F, Fut>(&self, what: &str, mut call: F) -> Result<T, DuffelError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DuffelError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    let delay = self.backoff_ms(attempt);
                    warn!(
                        call = what,
                        attempt,
                        delay_ms = delay,
                        error = %e,
                        "Transient upstream error, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
