//! Retry policy with exponential backoff for provider HTTP calls.
//!
//! Retries transient failures (timeouts, transport errors, 429 and 5xx) up
//! to `max_retries` times. Everything else fails on the first attempt.

use backoff::future::retry_notify;
use backoff::ExponentialBackoffBuilder;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::domain::errors::ProviderError;
use crate::domain::models::RetryConfig;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms.max(1)),
            max_backoff: Duration::from_millis(max_backoff_ms.max(initial_backoff_ms.max(1))),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }

    /// Policy that never retries.
    pub fn disabled() -> Self {
        Self::new(0, 1, 1)
    }

    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run `operation`, retrying transient failures.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_backoff)
            .with_max_interval(self.max_backoff)
            .with_max_elapsed_time(None)
            .build();

        let max_retries = self.max_retries;
        let mut attempt = 0u32;

        retry_notify(
            backoff,
            || {
                attempt += 1;
                let current = attempt;
                let fut = operation();
                async move {
                    match fut.await {
                        Ok(value) => Ok(value),
                        Err(err) if err.is_transient() && current <= max_retries => {
                            Err(backoff::Error::transient(err))
                        }
                        Err(err) => Err(backoff::Error::permanent(err)),
                    }
                }
            },
            |err: ProviderError, wait: Duration| {
                warn!(
                    provider = err.provider(),
                    error = %err,
                    wait_ms = wait.as_millis() as u64,
                    "transient provider failure, retrying"
                );
            },
        )
        .await
    }
}
