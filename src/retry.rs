use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::errors::Retryable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(400),
        }
    }
}

impl RetryPolicy {
    /// Sleep between attempt `attempt` (0-indexed) and the next one.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Run `operation` until it succeeds or the policy runs out of attempts, sleeping
/// `base_delay * 2^k` after failed attempt `k`. The last attempt's error is returned
/// as is. A cancelled error, or cancellation during a backoff sleep, ends the loop at once.
pub async fn with_retry<T, E, F, Fut>(
    policy: RetryPolicy,
    token: &CancellationToken,
    mut operation: F,
) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        if err.is_cancelled() || attempt + 1 >= max_attempts {
            return Err(err);
        }

        let delay = policy.delay_after(attempt);
        log::debug!("attempt {} failed ({err}), retrying in {delay:?}", attempt + 1);
        tokio::select! {
            biased;
            _ = token.cancelled() => return Err(E::cancelled()),
            _ = tokio::time::sleep(delay) => {}
        }
        attempt += 1;
    }
}
