use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::error::{OpenAiError, Result};

/// Retry policy for transient API failures. The delay before retry `n` is
/// `base_delay * multiplier^n` plus up to `jitter_ms` of random slack.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            multiplier: 3,
            jitter_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after the given zero-based attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        let backoff = self.base_delay * self.multiplier.pow(attempt);
        if self.jitter_ms == 0 {
            return backoff;
        }
        backoff + Duration::from_millis(rand::rng().random_range(0..self.jitter_ms))
    }

    /// Network failures, rate limits, and server errors are worth retrying;
    /// anything else fails fast.
    pub fn is_retryable(err: &OpenAiError) -> bool {
        match err {
            OpenAiError::Network(_) => true,
            OpenAiError::Api { status, .. } => *status == 429 || *status >= 500,
            OpenAiError::Parse(_) => false,
        }
    }

    /// Run an operation, retrying retryable errors up to `max_attempts`.
    pub async fn run<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if Self::is_retryable(&err) && attempt + 1 < self.max_attempts => {
                    let delay = self.delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retryable OpenAI error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
