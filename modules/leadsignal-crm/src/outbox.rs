use std::sync::Arc;

use rand::Rng;
use serde_json::Value as Json;

use leadsignal_store::Store;

use crate::connector::CrmConnector;
use crate::error::Result;
use crate::payload::ProspectPayload;

#[derive(Debug, Clone, Default)]
pub struct DrainStats {
    pub processed: u32,
    pub sent: u32,
    pub failed: u32,
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
}

pub struct OutboxWorkerConfig {
    pub backoff_base_seconds: f64,
    pub backoff_max_seconds: f64,
}

impl Default for OutboxWorkerConfig {
    fn default() -> Self {
        Self { backoff_base_seconds: 5.0, backoff_max_seconds: 300.0 }
    }
}

/// Drains queued CRM writes. The only writer of CRM state; safe to run
/// concurrently with collectors and the verification gate.
pub struct OutboxWorker {
    store: Arc<Store>,
    connector: Arc<dyn CrmConnector>,
    config: OutboxWorkerConfig,
}

impl OutboxWorker {
    pub fn new(store: Arc<Store>, connector: Arc<dyn CrmConnector>, config: OutboxWorkerConfig) -> Self {
        Self { store, connector, config }
    }

    pub async fn drain(&self, limit: i64) -> Result<DrainStats> {
        let mut stats = DrainStats::default();

        let entries = self.store.get_pending_outbox(limit).await?;
        if entries.is_empty() {
            return Ok(stats);
        }

        for entry in entries {
            stats.processed += 1;

            let payload: ProspectPayload = match serde_json::from_value(entry.payload.get("prospect").cloned().unwrap_or(Json::Null)) {
                Ok(p) => p,
                Err(e) => {
                    stats.failed += 1;
                    let backoff = self.compute_backoff(entry.attempts);
                    self.store.mark_outbox_failed(entry.id, &format!("bad payload: {e}"), backoff as i64).await?;
                    continue;
                }
            };

            match self.connector.upsert_prospect(&payload).await {
                Ok(result) => {
                    self.store.mark_outbox_sent(entry.id).await?;
                    stats.sent += 1;
                    match result.status {
                        crate::payload::UpsertStatus::Created => stats.created += 1,
                        crate::payload::UpsertStatus::Updated => stats.updated += 1,
                        crate::payload::UpsertStatus::Skipped => stats.skipped += 1,
                    }

                    let metadata = entry.payload.get("metadata").cloned();
                    for signal_id in &entry.signal_ids {
                        self.store.mark_pushed(*signal_id, &result.page_id, metadata.clone()).await?;
                    }
                }
                Err(e) => {
                    stats.failed += 1;
                    let backoff = self.compute_backoff(entry.attempts);
                    tracing::warn!(outbox_id = entry.id, error = %e, "outbox entry failed");
                    self.store.mark_outbox_failed(entry.id, &e.to_string(), backoff as i64).await?;
                }
            }
        }

        Ok(stats)
    }

    fn compute_backoff(&self, attempts: i32) -> f64 {
        backoff_for(&self.config, attempts)
    }
}

fn backoff_for(config: &OutboxWorkerConfig, attempts: i32) -> f64 {
    let attempt = attempts.max(0) + 1;
    let base = config.backoff_base_seconds * 2f64.powi(attempt - 1);
    let capped = base.min(config.backoff_max_seconds);
    capped + rand::rng().random_range(0.0..0.25)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let config = OutboxWorkerConfig::default();
        let first = backoff_for(&config, 0);
        let second = backoff_for(&config, 1);
        let many = backoff_for(&config, 20);
        assert!(first >= 5.0 && first < 5.25);
        assert!(second >= 10.0 && second < 10.25);
        assert!(many <= 300.25);
    }
}
