//! HTTP GET → JSON helper: rate limit, retry, typed error classification.

use serde::de::DeserializeOwned;

use crate::error::CollectorError;
use crate::rate_limiter::RateLimiterPool;
use crate::retry::{with_retry, RetryConfig};

/// Fetch a URL as JSON, acquiring the named API's rate limiter and retrying
/// under `retry_config`. Adapters call this instead of touching `reqwest`
/// or the rate limiter pool directly.
pub async fn http_get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    pool: &RateLimiterPool,
    api_name: &str,
    url: &str,
    retry_config: &RetryConfig,
) -> Result<T, CollectorError> {
    let limiter = pool.get(api_name);

    with_retry(retry_config, || {
        let client = client.clone();
        let limiter = limiter.clone();
        let url = url.to_string();
        async move {
            limiter.acquire().await;
            let response = client.get(&url).send().await.map_err(classify_reqwest_error)?;

            let status = response.status();
            if status.as_u16() == 429 {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<f64>().ok());
                return Err(CollectorError::RateLimited { retry_after });
            }
            if status.is_server_error() {
                return Err(CollectorError::Server { status: status.as_u16() });
            }
            if status.is_client_error() {
                return Err(CollectorError::Client { status: status.as_u16() });
            }

            response
                .json::<T>()
                .await
                .map_err(|e| CollectorError::InvalidJson(Box::new(e)))
        }
    })
    .await
}

fn classify_reqwest_error(err: reqwest::Error) -> CollectorError {
    if err.is_timeout() {
        CollectorError::Timeout
    } else {
        CollectorError::Network(Box::new(err))
    }
}
