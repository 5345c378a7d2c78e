//! Backoff retry for whole fetch operations
//!
//! The fetcher already retries individual requests; this wraps a complete
//! operation, such as one profile fetch, so a target that keeps failing
//! gets a fresh attempt after a longer pause. Failures the target cannot
//! recover from bail out immediately.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::utils::error::FetchError;

/// Attempt and delay budget for one retried operation
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts after the first failure
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds), doubling per attempt
    pub base_delay_ms: u64,

    /// Delay ceiling (milliseconds)
    pub max_delay_ms: u64,
}

impl RetryConfig {
    pub fn with_delays(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
        }
    }

    /// Doubling backoff, capped at the ceiling
    fn delay_for(&self, attempt: u32) -> Duration {
        let doubled = self
            .base_delay_ms
            .saturating_mul(1_u64 << attempt.saturating_sub(1).min(16));
        Duration::from_millis(doubled.min(self.max_delay_ms))
    }
}

/// Fetch failures worth another pass: the target may come back
///
/// Timeouts, exhausted per-request retries and server errors are
/// transient; login walls, client errors and invalid URLs are not.
pub fn is_transient_fetch(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<FetchError>(),
        Some(FetchError::Timeout | FetchError::MaxRetriesExceeded | FetchError::ServerError(_))
    )
}

/// Run `operation` until it succeeds or the attempt budget runs out
///
/// `should_retry` decides whether a failure deserves another attempt; a
/// rejected error is returned immediately without sleeping.
pub async fn with_retry_if<T, F, Fut, P>(
    config: &RetryConfig,
    operation: F,
    should_retry: P,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&anyhow::Error) -> bool,
{
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempt, "Operation recovered after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < config.max_retries && should_retry(&e) => {
                attempt += 1;
                let delay = config.delay_for(attempt);
                warn!(
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn no_delay(retries: u32) -> RetryConfig {
        RetryConfig::with_delays(retries, 0, 0)
    }

    #[tokio::test]
    async fn test_recovers_from_transient_failures() {
        let calls = AtomicU32::new(0);

        let result = with_retry_if(
            &no_delay(3),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(anyhow::Error::from(FetchError::ServerError(503)))
                    } else {
                        Ok(7)
                    }
                }
            },
            is_transient_fetch,
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = with_retry_if(
            &no_delay(3),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(anyhow::Error::from(FetchError::LoginRequired)) }
            },
            is_transient_fetch,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_budget_exhausted_returns_last_error() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = with_retry_if(
            &no_delay(2),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(anyhow::Error::from(FetchError::Timeout)) }
            },
            is_transient_fetch,
        )
        .await;

        assert!(result.unwrap_err().to_string().contains("timeout"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_delay_doubles_then_caps() {
        let config = RetryConfig::with_delays(5, 1000, 3000);

        assert_eq!(config.delay_for(1), Duration::from_millis(1000));
        assert_eq!(config.delay_for(2), Duration::from_millis(2000));
        assert_eq!(config.delay_for(3), Duration::from_millis(3000));
        assert_eq!(config.delay_for(4), Duration::from_millis(3000));
    }

    #[test]
    fn test_transient_classification() {
        assert!(is_transient_fetch(&anyhow::Error::from(FetchError::Timeout)));
        assert!(is_transient_fetch(&anyhow::Error::from(
            FetchError::ServerError(502)
        )));
        assert!(!is_transient_fetch(&anyhow::Error::from(
            FetchError::LoginRequired
        )));
        assert!(!is_transient_fetch(&anyhow::anyhow!("parse failure")));
    }
}
