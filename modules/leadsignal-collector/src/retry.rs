//! Centralized retry strategy for collector adapters.

use rand::Rng;

use crate::error::CollectorError;

/// Exponential backoff with jitter, `Retry-After` override on 429, and
/// retryable-error classification. Mirrors the collector runtime's
/// single retry policy so every adapter backs off identically.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub backoff_base: f64,
    pub backoff_max: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 3, backoff_base: 2.0, backoff_max: 30.0, jitter: true }
    }
}

impl RetryConfig {
    /// Wait time for a zero-indexed attempt, before any `Retry-After` override.
    pub fn wait_seconds(&self, attempt: u32) -> f64 {
        let wait = self.backoff_base.powi(attempt as i32).min(self.backoff_max);
        if self.jitter {
            let jitter_factor = 0.75 + rand::rng().random::<f64>() * 0.5;
            wait * jitter_factor
        } else {
            wait
        }
    }
}

/// Run `op` under the retry policy, retrying on retryable errors until
/// `max_retries` is exhausted, then surfacing the last error.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, CollectorError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, CollectorError>>,
{
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) => {
                if attempt >= config.max_retries {
                    last_error = Some(err);
                    break;
                }
                let wait_secs = err.retry_after_seconds().unwrap_or_else(|| config.wait_seconds(attempt));
                tracing::warn!(attempt, wait_secs, error = %err, "collector request failed, retrying");
                tokio::time::sleep(std::time::Duration::from_secs_f64(wait_secs)).await;
                last_error = Some(err);
            }
        }
    }

    Err(last_error.expect("loop always either returns or sets last_error"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn wait_seconds_is_exponential_and_capped() {
        let config = RetryConfig { jitter: false, ..Default::default() };
        assert_eq!(config.wait_seconds(0), 1.0);
        assert_eq!(config.wait_seconds(1), 2.0);
        assert_eq!(config.wait_seconds(2), 4.0);
        assert_eq!(config.wait_seconds(10), config.backoff_max);
    }

    #[test]
    fn jitter_stays_within_quarter_range() {
        let config = RetryConfig::default();
        for _ in 0..100 {
            let wait = config.wait_seconds(2);
            assert!(wait >= 4.0 * 0.75 && wait <= 4.0 * 1.25);
        }
    }

    #[tokio::test]
    async fn retries_retryable_errors_until_success() {
        let attempts = AtomicU32::new(0);
        let config = RetryConfig { backoff_base: 0.001, backoff_max: 0.001, jitter: false, ..Default::default() };

        let result = with_retry(&config, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(CollectorError::Server { status: 503 })
                } else {
                    Ok(42)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_non_retryable_errors() {
        let attempts = AtomicU32::new(0);
        let config = RetryConfig::default();

        let result: Result<(), _> = with_retry(&config, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(CollectorError::Client { status: 404 }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn surfaces_last_error_after_exhausting_retries() {
        let config = RetryConfig { max_retries: 2, backoff_base: 0.001, backoff_max: 0.001, jitter: false };
        let result: Result<(), _> =
            with_retry(&config, || async { Err(CollectorError::Timeout) }).await;
        assert!(matches!(result, Err(CollectorError::Timeout)));
    }
}
