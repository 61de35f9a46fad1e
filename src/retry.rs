//! Fixed-delay retry for fallible async units of work.
//!
//! The policy knows nothing about HTTP: it calls a closure until it succeeds or
//! the attempt budget runs out, sleeping a constant delay between attempts.
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// How often to attempt a unit of work and how long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

/// Returned once every attempt has failed. Carries the final attempt's error.
#[derive(Debug, Error)]
#[error("gave up after {attempts} attempts: {last}")]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last: E,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

impl RetryPolicy {
    /// A budget of 0 attempts is treated as 1: the unit always runs at least once.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `op` until it returns `Ok` or `max_attempts` calls have failed.
    ///
    /// `op` receives the 1-based attempt number. After every failed attempt
    /// except the last, the calling task sleeps for `delay`; there is no
    /// backoff. `label` only appears in log lines.
    ///
    /// # Errors
    ///
    /// Returns [`RetryExhausted`] with the last error once the budget is spent.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(
                        subject = %label,
                        attempt = attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = self.delay.as_millis() as u64,
                        error = %e,
                        "Attempt failed, retrying after delay"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        subject = %label,
                        attempts = attempt,
                        error = %e,
                        "All attempts failed"
                    );
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last: e,
                    });
                }
            }
        }
    }
}
