//! Retry with exponential backoff for transient source failures.

use crate::config::RetryConfig;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Attempt schedule for transient failures. The wait doubles from
/// `min_wait` up to `max_wait` between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    min_wait: Duration,
    max_wait: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, min_wait: Duration, max_wait: Duration) -> Self {
        Self {
            max_attempts,
            min_wait,
            max_wait,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs(config.min_wait_secs),
            Duration::from_secs(config.max_wait_secs),
        )
    }

    /// Runs the operation until it succeeds or the attempts are exhausted.
    /// The final error is returned unchanged.
    pub async fn run<F, Fut, T, E>(&self, operation_name: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut wait = self.min_wait;
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts => {
                    warn!(
                        operation = operation_name,
                        attempt,
                        wait_secs = wait.as_secs(),
                        error = %err,
                        "Attempt failed, backing off before retry"
                    );
                    tokio::time::sleep(wait).await;
                    wait = (wait * 2).min(self.max_wait);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2), Duration::from_secs(10))
    }
}
