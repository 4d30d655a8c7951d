//! Fixed-delay retry for record updates
//!
//! A 429 waits the server's `Retry-After` when given; everything else waits the
//! configured delay. There is no exponential growth and no sleep after the final
//! attempt.

use ddns_core::Error;
use ddns_core::config::RetryConfig;
use std::future::Future;
use std::time::Duration;

/// Wait before the attempt following `error`
pub fn retry_delay(error: &Error, policy: &RetryConfig) -> Duration {
    if error.is_rate_limited()
        && let Some(wait) = error.retry_after()
    {
        return wait;
    }
    policy.delay()
}

/// Run `operation` up to `policy.max_attempts` times
///
/// Returns the first success, or the last error once every attempt failed.
pub async fn with_retry<T, F, Fut>(policy: &RetryConfig, mut operation: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                let delay = retry_delay(&e, policy);
                tracing::warn!(
                    "Attempt {}/{} failed: {}. Retrying in {}ms",
                    attempt,
                    attempts,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
