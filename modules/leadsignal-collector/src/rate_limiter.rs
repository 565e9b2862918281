//! Per-API token-bucket rate limiting.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use tokio::sync::Mutex as AsyncMutex;

/// Token bucket for a single API. `rate` tokens refill every `period`
/// seconds; `acquire()` blocks until a token is available. `rate = None`
/// means unlimited — `acquire()` is then a no-op.
pub struct RateLimiter {
    rate: Option<f64>,
    period_secs: f64,
    state: AsyncMutex<BucketState>,
}

struct BucketState {
    tokens: f64,
    last_refill: Option<Instant>,
}

impl RateLimiter {
    pub fn new(rate: Option<u32>, period_secs: f64) -> Self {
        let rate = rate.map(|r| r as f64);
        Self {
            rate,
            period_secs,
            state: AsyncMutex::new(BucketState { tokens: rate.unwrap_or(f64::INFINITY), last_refill: None }),
        }
    }

    pub async fn acquire(&self) {
        let Some(rate) = self.rate else { return };

        let wait_secs = {
            let mut state = self.state.lock().await;
            let now = Instant::now();

            if state.last_refill.is_none() {
                state.last_refill = Some(now);
                state.tokens = rate;
            }

            let elapsed = now.duration_since(state.last_refill.unwrap()).as_secs_f64();
            let refill = elapsed * (rate / self.period_secs);
            state.tokens = (state.tokens + refill).min(rate);
            state.last_refill = Some(now);

            let wait_secs = if state.tokens < 1.0 {
                let wait = (1.0 - state.tokens) * (self.period_secs / rate);
                state.tokens = 1.0;
                Some(wait)
            } else {
                None
            };
            state.tokens -= 1.0;
            wait_secs
        };

        if let Some(wait_secs) = wait_secs {
            tracing::debug!(wait_secs, "rate limit: waiting for token");
            tokio::time::sleep(std::time::Duration::from_secs_f64(wait_secs)).await;
        }
    }
}

/// Preconfigured rate limits for known source APIs, `(rate, period_secs)`.
/// `rate = None` means unlimited.
pub const API_LIMITS: &[(&str, Option<u32>, f64)] = &[
    ("github", Some(5000), 3600.0),
    ("github_activity", Some(5000), 3600.0),
    ("sec_edgar", Some(10), 1.0),
    ("companies_house", Some(600), 300.0),
    ("domain_whois", None, 1.0),
    ("job_postings", None, 1.0),
    ("product_hunt", Some(100), 3600.0),
    ("arxiv", None, 1.0),
    ("uspto", None, 1.0),
    ("hacker_news", Some(100), 60.0),
];

/// Process-wide pool of rate limiters, one per `api_name`. Shared across
/// collector instances so limits are enforced globally, not per adapter.
pub struct RateLimiterPool {
    limiters: Mutex<HashMap<String, std::sync::Arc<RateLimiter>>>,
}

impl RateLimiterPool {
    pub fn new() -> Self {
        Self { limiters: Mutex::new(HashMap::new()) }
    }

    pub fn get(&self, api_name: &str) -> std::sync::Arc<RateLimiter> {
        let mut limiters = self.limiters.lock().expect("rate limiter pool poisoned");
        if let Some(limiter) = limiters.get(api_name) {
            return limiter.clone();
        }
        let (rate, period) = API_LIMITS
            .iter()
            .find(|(name, _, _)| *name == api_name)
            .map(|(_, rate, period)| (*rate, *period))
            .unwrap_or((None, 1.0));
        let limiter = std::sync::Arc::new(RateLimiter::new(rate, period));
        limiters.insert(api_name.to_string(), limiter.clone());
        limiter
    }

    /// Clear all limiters — test-only hook, mirrors the original pool's reset().
    pub fn reset(&self) {
        self.limiters.lock().expect("rate limiter pool poisoned").clear();
    }
}

impl Default for RateLimiterPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Global pool instance, one per process.
pub fn global_pool() -> &'static RateLimiterPool {
    static POOL: std::sync::OnceLock<RateLimiterPool> = std::sync::OnceLock::new();
    POOL.get_or_init(RateLimiterPool::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unlimited_limiter_never_blocks() {
        let limiter = RateLimiter::new(None, 1.0);
        for _ in 0..1000 {
            limiter.acquire().await;
        }
    }

    #[tokio::test]
    async fn limited_limiter_allows_burst_up_to_rate() {
        let limiter = RateLimiter::new(Some(5), 60.0);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        // First `rate` acquisitions should not block meaningfully.
        assert!(start.elapsed().as_secs_f64() < 1.0);
    }

    #[test]
    fn pool_known_apis_match_spec_table() {
        let pool = RateLimiterPool::new();
        let github = pool.get("github");
        assert_eq!(github.rate, Some(5000.0));
        let sec = pool.get("sec_edgar");
        assert_eq!(sec.rate, Some(10.0));
        let unknown = pool.get("something_new");
        assert_eq!(unknown.rate, None);
    }

    #[test]
    fn reset_clears_cached_limiters() {
        let pool = RateLimiterPool::new();
        let first = pool.get("github");
        pool.reset();
        let second = pool.get("github");
        assert!(!std::sync::Arc::ptr_eq(&first, &second));
    }
}
