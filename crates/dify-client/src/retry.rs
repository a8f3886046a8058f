//! Retry with exponential backoff.
//!
//! Only transport failures ([`Error::is_retryable`]) are retried. Any HTTP
//! response, including 5xx and 429, ends the loop on first occurrence.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default backoff factor.
pub const DEFAULT_BACKOFF_FACTOR: Duration = Duration::from_secs(1);

/// Retry settings for one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; a call makes at most `max_retries + 1` attempts.
    pub max_retries: u32,
    /// Delay unit; the wait before retrying attempt `k` (0-based) is `factor * 2^k`.
    pub backoff_factor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_retries: u32, backoff_factor: Duration) -> Self {
        Self {
            max_retries,
            backoff_factor,
        }
    }

    /// Same policy with a different retry count.
    pub fn with_max_retries(self, max_retries: u32) -> Self {
        Self {
            max_retries,
            ..self
        }
    }

    /// Total attempts allowed.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay after the failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_factor
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Suspends the current task between attempts.
///
/// The client uses [`TokioSleeper`]; tests substitute a recorder to observe
/// the requested delays without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `delay`.
    async fn sleep(&self, delay: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Run `f` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up.
///
/// `f` receives the 0-based attempt number. After exhaustion the last
/// transport error is returned.
pub async fn with_retry<F, Fut, T>(
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
    request_id: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..policy.max_attempts() {
        match f(attempt).await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_retryable() {
                    return Err(e);
                }

                tracing::warn!(
                    request_id,
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts(),
                    error = %e,
                    "Request failed"
                );
                last_error = Some(e);

                if attempt < policy.max_retries {
                    let delay = policy.delay_for(attempt);
                    tracing::info!(
                        request_id,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying after backoff"
                    );
                    sleeper.sleep(delay).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        Error::Connection(format!("request {request_id} made no attempts"))
    }))
}
