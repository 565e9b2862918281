use thiserror::Error;

/// Errors surfaced by the collector runtime's HTTP helper. Distinguishes
/// network/timeout failures (always retryable), rate limiting and 5xx
/// (retryable), and other 4xx (not retryable).
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("request timed out")]
    Timeout,

    #[error("rate limited (HTTP 429){}", retry_after.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after: Option<f64> },

    #[error("server error: HTTP {status}")]
    Server { status: u16 },

    #[error("client error: HTTP {status}")]
    Client { status: u16 },

    #[error("failed to parse JSON response: {0}")]
    InvalidJson(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Store(#[from] leadsignal_store::StoreError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl CollectorError {
    /// Network/timeout/5xx/429 are retryable; other 4xx and decode errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CollectorError::Network(_)
                | CollectorError::Timeout
                | CollectorError::RateLimited { .. }
                | CollectorError::Server { .. }
        )
    }

    /// `Retry-After` override, when this error is a 429 that carried one.
    pub fn retry_after_seconds(&self) -> Option<f64> {
        match self {
            CollectorError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CollectorError>;
