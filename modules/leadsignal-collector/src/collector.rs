//! Collector runtime: adapter contract, dedup, per-run state machine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as Json;

use leadsignal_store::{NewSignal, Store};

use crate::error::CollectorError;
use crate::retry::RetryConfig;

/// A signal candidate produced by an adapter, before canonical-key
/// resolution and persistence. An adapter may supply several candidate
/// canonical keys in priority order (e.g. a resolved website domain first,
/// falling back to a weaker derived key).
#[derive(Debug, Clone)]
pub struct CollectedSignal {
    pub signal_type: String,
    pub canonical_key_candidates: Vec<String>,
    pub confidence: f64,
    pub raw_data: Json,
    pub company_name: Option<String>,
    pub detected_at: Option<DateTime<Utc>>,
}

/// Adapter contract. Each adapter supplies a name, the rate-limit bucket it
/// draws from, a retry policy, and a single `collect()` operation. Adapters
/// never touch the store or rate limiter pool directly — only through the
/// `http_get_json` helper, which the runtime threads `api_name` and
/// `retry_policy` into.
#[async_trait]
pub trait Collector: Send + Sync {
    fn collector_name(&self) -> &str;
    fn api_name(&self) -> &str;

    fn retry_policy(&self) -> RetryConfig {
        RetryConfig::default()
    }

    async fn collect(&self) -> Result<Vec<CollectedSignal>, CollectorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    DryRun,
    Success,
    PartialSuccess,
    Error,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunState::DryRun => "dry_run",
            RunState::Success => "success",
            RunState::PartialSuccess => "partial_success",
            RunState::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Summary of a single `run()` invocation.
#[derive(Debug, Clone)]
pub struct CollectorResult {
    pub collector_name: String,
    pub state: RunState,
    pub signals_found: u32,
    pub signals_new: u32,
    pub signals_suppressed: u32,
    pub errors: Vec<String>,
}

const MAX_RETAINED_ERRORS: usize = 5;

/// Drive a collector: call `collect()`, then dedup and persist each
/// produced signal against the store's three gates (seen this run /
/// already in store / suppressed in the CRM cache). `dry_run = true` skips
/// persistence entirely and reports what would have been saved.
pub async fn run(collector: &dyn Collector, store: &Store, dry_run: bool) -> CollectorResult {
    let name = collector.collector_name().to_string();

    let signals = match collector.collect().await {
        Ok(signals) => signals,
        Err(err) => {
            return CollectorResult {
                collector_name: name,
                state: RunState::Error,
                signals_found: 0,
                signals_new: 0,
                signals_suppressed: 0,
                errors: vec![err.to_string()],
            };
        }
    };

    let mut seen_this_run = std::collections::HashSet::new();
    let mut signals_new = 0u32;
    let mut signals_suppressed = 0u32;
    let mut errors = Vec::new();

    for signal in &signals {
        let canonical_key = match resolve_canonical_key(signal) {
            Some(key) => key,
            None => {
                tracing::warn!(
                    signal_type = %signal.signal_type,
                    "signal has no canonical key candidates, dropping"
                );
                continue;
            }
        };

        if !seen_this_run.insert(canonical_key.clone()) {
            signals_suppressed += 1;
            continue;
        }

        match is_suppressed(store, &canonical_key).await {
            Ok(true) => {
                signals_suppressed += 1;
                continue;
            }
            Ok(false) => {}
            Err(err) => {
                push_error(&mut errors, err.to_string());
                continue;
            }
        }

        if dry_run {
            signals_new += 1;
            continue;
        }

        let new_signal = NewSignal {
            signal_type: signal.signal_type.clone(),
            source_api: collector.api_name().to_string(),
            canonical_key,
            confidence: signal.confidence,
            raw_data: signal.raw_data.clone(),
            company_name: signal.company_name.clone(),
            detected_at: signal.detected_at,
        };

        match store.save_signal(new_signal).await {
            Ok(_) => signals_new += 1,
            Err(err) => push_error(&mut errors, err.to_string()),
        }
    }

    let state = if dry_run {
        RunState::DryRun
    } else if errors.is_empty() {
        RunState::Success
    } else if signals_new > 0 {
        RunState::PartialSuccess
    } else {
        RunState::Error
    };

    CollectorResult {
        collector_name: name,
        state,
        signals_found: signals.len() as u32,
        signals_new,
        signals_suppressed,
        errors,
    }
}

fn resolve_canonical_key(signal: &CollectedSignal) -> Option<String> {
    signal.canonical_key_candidates.first().cloned()
}

async fn is_suppressed(store: &Store, canonical_key: &str) -> Result<bool, leadsignal_store::StoreError> {
    if store.is_duplicate(canonical_key).await? {
        return Ok(true);
    }
    Ok(store.check_suppression(canonical_key).await?.is_some())
}

fn push_error(errors: &mut Vec<String>, message: String) {
    if errors.len() < MAX_RETAINED_ERRORS {
        errors.push(message);
    }
}
