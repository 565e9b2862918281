use std::sync::Arc;

use chrono::{DateTime, Utc};

use leadsignal_store::{Store, SuppressionEntry};

use crate::connector::CrmConnector;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct SyncStats {
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub pages_fetched: u32,
    pub entries_synced: u32,
    pub entries_skipped: u32,
    pub entries_expired_cleared: u64,
    pub errors: Vec<String>,
    pub dry_run: bool,
}

impl SyncStats {
    fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            completed_at: None,
            pages_fetched: 0,
            entries_synced: 0,
            entries_skipped: 0,
            entries_expired_cleared: 0,
            errors: Vec::new(),
            dry_run,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        match self.completed_at {
            Some(end) => (end - self.started_at).num_milliseconds() as f64 / 1000.0,
            None => 0.0,
        }
    }
}

/// Periodically enumerates the CRM and caches canonical keys locally, so the
/// collector layer can skip companies already tracked there.
pub struct SuppressionSync {
    store: Arc<Store>,
    connector: Arc<dyn CrmConnector>,
    ttl_days: i64,
}

impl SuppressionSync {
    pub fn new(store: Arc<Store>, connector: Arc<dyn CrmConnector>, ttl_days: i64) -> Self {
        Self { store, connector, ttl_days }
    }

    pub async fn sync(&self, dry_run: bool) -> Result<SyncStats> {
        let mut stats = SyncStats::new(dry_run);
        tracing::info!(dry_run, "starting suppression sync");

        let records = match self.connector.enumerate_records().await {
            Ok(records) => records,
            Err(e) => {
                stats.errors.push(format!("enumerate failed: {e}"));
                stats.completed_at = Some(Utc::now());
                return Ok(stats);
            }
        };
        stats.pages_fetched = records.len() as u32;

        for record in &records {
            let Some(canonical_key) = self.connector.extract_canonical_key(record) else {
                stats.entries_skipped += 1;
                continue;
            };

            if !dry_run {
                let entry = SuppressionEntry {
                    canonical_key,
                    crm_page_id: record.page_id.clone(),
                    crm_status: record.status.clone(),
                    company_name: record.company_name.clone(),
                    synced_at: Utc::now(),
                    expires_at: Utc::now() + chrono::Duration::days(self.ttl_days),
                };
                if let Err(e) = self.store.add_suppression(&entry, self.ttl_days).await {
                    stats.errors.push(format!("error processing page {}: {e}", record.page_id));
                    continue;
                }
            }
            stats.entries_synced += 1;
        }

        if !dry_run {
            match self.store.clear_expired_suppressions().await {
                Ok(cleared) => stats.entries_expired_cleared = cleared,
                Err(e) => stats.errors.push(format!("clear expired failed: {e}")),
            }
        }

        stats.completed_at = Some(Utc::now());
        tracing::info!(
            synced = stats.entries_synced,
            skipped = stats.entries_skipped,
            errors = stats.errors.len(),
            "suppression sync complete"
        );
        Ok(stats)
    }
}
