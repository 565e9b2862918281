pub mod adapters;
pub mod collector;
pub mod delta;
pub mod error;
pub mod http;
pub mod rate_limiter;
pub mod retry;

pub use collector::{run, CollectedSignal, Collector, CollectorResult, RunState};
pub use delta::{classify_delta, save_snapshot, DeltaKind};
pub use error::{CollectorError, Result};
pub use rate_limiter::{global_pool, RateLimiter, RateLimiterPool};
pub use retry::{with_retry, RetryConfig};
