//! Store — durable signal/asset/suppression/outbox storage backed by Postgres.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value as Json;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::types::{
    AssetToLead, FounderProfile, NewSignal, OutboxEntry, OutboxStatus, PipelineRun,
    ProcessingStatus, ResolvedBy, Signal, SourceAsset, StoreStats, SuppressionEntry,
    SuppressionStats,
};

/// Durable store for signals, source-asset snapshots, suppression cache,
/// asset-to-lead links, the CRM outbox, and pipeline-run telemetry.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // -- Signals -----------------------------------------------------------

    pub async fn save_signal(&self, signal: NewSignal) -> Result<i64> {
        let detected_at = signal.detected_at.unwrap_or_else(Utc::now);
        let row = sqlx::query_as::<_, (i64,)>(
            r#"
            INSERT INTO signals
                (signal_type, source_api, canonical_key, confidence, raw_data,
                 company_name, detected_at, processing_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING id
            "#,
        )
        .bind(&signal.signal_type)
        .bind(&signal.source_api)
        .bind(&signal.canonical_key)
        .bind(signal.confidence)
        .bind(&signal.raw_data)
        .bind(&signal.company_name)
        .bind(detected_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    pub async fn is_duplicate(&self, canonical_key: &str) -> Result<bool> {
        let row = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS(SELECT 1 FROM signals WHERE canonical_key = $1 AND processing_status <> 'rejected')",
        )
        .bind(canonical_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    pub async fn get_signals_for_company(&self, canonical_key: &str) -> Result<Vec<Signal>> {
        let rows = sqlx::query_as::<_, Signal>(
            r#"
            SELECT id, signal_type, source_api, canonical_key, confidence, raw_data,
                   company_name, detected_at, created_at, processing_status,
                   crm_page_id, error_message
            FROM signals
            WHERE canonical_key = $1
            ORDER BY detected_at DESC
            "#,
        )
        .bind(canonical_key)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_pending_signals(
        &self,
        limit: Option<i64>,
        signal_type: Option<&str>,
    ) -> Result<Vec<Signal>> {
        let limit = limit.unwrap_or(100);
        let rows = sqlx::query_as::<_, Signal>(
            r#"
            SELECT id, signal_type, source_api, canonical_key, confidence, raw_data,
                   company_name, detected_at, created_at, processing_status,
                   crm_page_id, error_message
            FROM signals
            WHERE processing_status = 'pending'
              AND ($1::text IS NULL OR signal_type = $1)
            ORDER BY confidence DESC, detected_at DESC
            LIMIT $2
            "#,
        )
        .bind(signal_type)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn mark_pushed(
        &self,
        id: i64,
        crm_page_id: &str,
        metadata: Option<Json>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE signals
            SET processing_status = 'pushed', crm_page_id = $2, error_message = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(crm_page_id)
        .bind(metadata.map(|m| m.to_string()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("signal {id}")));
        }
        Ok(())
    }

    pub async fn mark_rejected(&self, id: i64, reason: &str, metadata: Option<Json>) -> Result<()> {
        let message = match metadata {
            Some(m) => format!("{reason} | {m}"),
            None => reason.to_string(),
        };
        let result = sqlx::query(
            r#"
            UPDATE signals
            SET processing_status = 'rejected', error_message = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(message)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("signal {id}")));
        }
        Ok(())
    }

    // -- Suppression cache ---------------------------------------------------

    pub async fn check_suppression(&self, canonical_key: &str) -> Result<Option<SuppressionEntry>> {
        let row = sqlx::query_as::<_, SuppressionEntry>(
            r#"
            SELECT canonical_key, crm_page_id, crm_status, company_name, synced_at, expires_at
            FROM suppression_cache
            WHERE canonical_key = $1
            "#,
        )
        .bind(canonical_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.filter(|entry| !entry.is_expired_at(Utc::now())))
    }

    pub async fn add_suppression(&self, entry: &SuppressionEntry, ttl_days: i64) -> Result<()> {
        let expires_at = entry.synced_at + Duration::days(ttl_days);
        sqlx::query(
            r#"
            INSERT INTO suppression_cache
                (canonical_key, crm_page_id, crm_status, company_name, synced_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (canonical_key) DO UPDATE SET
                crm_page_id = EXCLUDED.crm_page_id,
                crm_status = EXCLUDED.crm_status,
                company_name = EXCLUDED.company_name,
                synced_at = EXCLUDED.synced_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&entry.canonical_key)
        .bind(&entry.crm_page_id)
        .bind(&entry.crm_status)
        .bind(&entry.company_name)
        .bind(entry.synced_at)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn clear_expired_suppressions(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM suppression_cache WHERE expires_at < now()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn get_suppression_stats(&self) -> Result<SuppressionStats> {
        let totals = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE expires_at >= now()) AS active,
                COUNT(*) FILTER (WHERE expires_at < now()) AS expired
            FROM suppression_cache
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let by_status_rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT crm_status, COUNT(*) FROM suppression_cache GROUP BY crm_status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(SuppressionStats {
            total_entries: totals.0,
            active_entries: totals.1,
            expired_entries: totals.2,
            by_status: by_status_rows.into_iter().collect(),
        })
    }

    // -- Source assets ---------------------------------------------------

    pub async fn save_asset(
        &self,
        source_type: &str,
        external_id: &str,
        raw_payload: &Json,
        change_detected: bool,
    ) -> Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>(
            r#"
            INSERT INTO source_assets (source_type, external_id, raw_payload, fetched_at, change_detected)
            VALUES ($1, $2, $3, now(), $4)
            RETURNING id
            "#,
        )
        .bind(source_type)
        .bind(external_id)
        .bind(raw_payload)
        .bind(change_detected)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    pub async fn get_latest_snapshot(
        &self,
        source_type: &str,
        external_id: &str,
    ) -> Result<Option<SourceAsset>> {
        let row = sqlx::query_as::<_, SourceAsset>(
            r#"
            SELECT id, source_type, external_id, raw_payload, fetched_at, change_detected, created_at
            FROM source_assets
            WHERE source_type = $1 AND external_id = $2
            ORDER BY fetched_at DESC
            LIMIT 1
            "#,
        )
        .bind(source_type)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_previous_snapshot(
        &self,
        source_type: &str,
        external_id: &str,
    ) -> Result<Option<SourceAsset>> {
        let row = sqlx::query_as::<_, SourceAsset>(
            r#"
            SELECT id, source_type, external_id, raw_payload, fetched_at, change_detected, created_at
            FROM source_assets
            WHERE source_type = $1 AND external_id = $2
            ORDER BY fetched_at DESC
            OFFSET 1
            LIMIT 1
            "#,
        )
        .bind(source_type)
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_assets_with_changes(&self, limit: i64) -> Result<Vec<SourceAsset>> {
        let rows = sqlx::query_as::<_, SourceAsset>(
            r#"
            SELECT id, source_type, external_id, raw_payload, fetched_at, change_detected, created_at
            FROM source_assets
            WHERE change_detected = true
            ORDER BY fetched_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_by_source_type(&self) -> Result<HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT source_type, COUNT(*) FROM source_assets GROUP BY source_type",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn get_snapshot_count(&self, source_type: &str, external_id: &str) -> Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM source_assets WHERE source_type = $1 AND external_id = $2",
        )
        .bind(source_type)
        .bind(external_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    // -- Entity resolution links ---------------------------------------------------

    /// Apply the precedence rule from the data model: manual links always
    /// win; otherwise the higher-confidence non-manual link wins.
    pub async fn create_link(&self, link: &AssetToLead) -> Result<()> {
        let existing = sqlx::query_as::<_, AssetToLead>(
            r#"
            SELECT asset_id, source_type, external_id, lead_canonical_key, confidence,
                   resolved_by, resolved_at, metadata
            FROM asset_to_lead
            WHERE source_type = $1 AND external_id = $2
            "#,
        )
        .bind(&link.source_type)
        .bind(&link.external_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(existing) = &existing {
            let existing_wins = existing.resolved_by.is_manual()
                || (!link.resolved_by.is_manual() && existing.confidence >= link.confidence);
            if existing_wins {
                return Ok(());
            }
        }

        sqlx::query(
            r#"
            INSERT INTO asset_to_lead
                (asset_id, source_type, external_id, lead_canonical_key, confidence,
                 resolved_by, resolved_at, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (source_type, external_id) DO UPDATE SET
                asset_id = EXCLUDED.asset_id,
                lead_canonical_key = EXCLUDED.lead_canonical_key,
                confidence = EXCLUDED.confidence,
                resolved_by = EXCLUDED.resolved_by,
                resolved_at = EXCLUDED.resolved_at,
                metadata = EXCLUDED.metadata
            "#,
        )
        .bind(link.asset_id)
        .bind(&link.source_type)
        .bind(&link.external_id)
        .bind(&link.lead_canonical_key)
        .bind(link.confidence)
        .bind(link.resolved_by.to_string())
        .bind(link.resolved_at)
        .bind(&link.metadata)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_lead_for_asset(
        &self,
        source_type: &str,
        external_id: &str,
        min_confidence: f64,
    ) -> Result<Option<String>> {
        let row = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT lead_canonical_key FROM asset_to_lead
            WHERE source_type = $1 AND external_id = $2 AND confidence >= $3
            "#,
        )
        .bind(source_type)
        .bind(external_id)
        .bind(min_confidence)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn get_assets_for_lead(&self, canonical_key: &str) -> Result<Vec<AssetToLead>> {
        let rows = sqlx::query_as::<_, AssetToLead>(
            r#"
            SELECT asset_id, source_type, external_id, lead_canonical_key, confidence,
                   resolved_by, resolved_at, metadata
            FROM asset_to_lead
            WHERE lead_canonical_key = $1
            ORDER BY resolved_at DESC
            "#,
        )
        .bind(canonical_key)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_unresolved_assets(&self, limit: i64) -> Result<Vec<SourceAsset>> {
        let rows = sqlx::query_as::<_, SourceAsset>(
            r#"
            SELECT a.id, a.source_type, a.external_id, a.raw_payload, a.fetched_at,
                   a.change_detected, a.created_at
            FROM source_assets a
            LEFT JOIN asset_to_lead l
                ON l.source_type = a.source_type AND l.external_id = a.external_id
            WHERE l.asset_id IS NULL
            ORDER BY a.fetched_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // -- CRM outbox ---------------------------------------------------

    pub async fn enqueue(&self, payload: Json, signal_ids: &[i64]) -> Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>(
            r#"
            INSERT INTO crm_outbox (payload, signal_ids, status, attempts, next_attempt_at)
            VALUES ($1, $2, 'pending', 0, now())
            RETURNING id
            "#,
        )
        .bind(&payload)
        .bind(signal_ids)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    pub async fn get_pending_outbox(&self, limit: i64) -> Result<Vec<OutboxEntry>> {
        let rows = sqlx::query_as::<_, OutboxEntry>(
            r#"
            SELECT id, payload, signal_ids, status, attempts, next_attempt_at, last_error, created_at
            FROM crm_outbox
            WHERE status IN ('pending', 'failed') AND next_attempt_at <= now()
            ORDER BY next_attempt_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn mark_outbox_sent(&self, id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE crm_outbox SET status = 'sent' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("outbox entry {id}")));
        }
        Ok(())
    }

    pub async fn mark_outbox_failed(
        &self,
        id: i64,
        error: &str,
        backoff_seconds: i64,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE crm_outbox
            SET status = 'failed', attempts = attempts + 1, last_error = $2,
                next_attempt_at = now() + ($3 * interval '1 second')
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(backoff_seconds)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("outbox entry {id}")));
        }
        Ok(())
    }

    // -- Pipeline telemetry ---------------------------------------------------

    pub async fn save_pipeline_run(
        &self,
        started_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
        stats: Json,
        errors: &[String],
    ) -> Result<Uuid> {
        let row = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO pipeline_runs (run_id, started_at, completed_at, stats, errors)
            VALUES (gen_random_uuid(), $1, $2, $3, $4)
            RETURNING run_id
            "#,
        )
        .bind(started_at)
        .bind(completed_at)
        .bind(&stats)
        .bind(errors)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    pub async fn get_pipeline_run(&self, run_id: Uuid) -> Result<Option<PipelineRun>> {
        let row = sqlx::query_as::<_, PipelineRun>(
            r#"
            SELECT run_id, started_at, completed_at, stats, errors
            FROM pipeline_runs
            WHERE run_id = $1
            "#,
        )
        .bind(run_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_pipeline_runs(&self, limit: i64) -> Result<Vec<PipelineRun>> {
        let rows = sqlx::query_as::<_, PipelineRun>(
            r#"
            SELECT run_id, started_at, completed_at, stats, errors
            FROM pipeline_runs
            ORDER BY started_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // -- Aggregate stats ---------------------------------------------------

    pub async fn get_stats(&self) -> Result<StoreStats> {
        let by_type = sqlx::query_as::<_, (String, i64)>(
            "SELECT signal_type, COUNT(*) FROM signals GROUP BY signal_type",
        )
        .fetch_all(&self.pool)
        .await?;

        let by_status = sqlx::query_as::<_, (String, i64)>(
            "SELECT processing_status, COUNT(*) FROM signals GROUP BY processing_status",
        )
        .fetch_all(&self.pool)
        .await?;

        let active_suppression_count = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM suppression_cache WHERE expires_at >= now()",
        )
        .fetch_one(&self.pool)
        .await?
        .0;

        Ok(StoreStats {
            signals_by_type: by_type.into_iter().collect(),
            signals_by_status: by_status.into_iter().collect(),
            active_suppression_count,
        })
    }

    // -- Founder store ---------------------------------------------------

    pub async fn save_founder(&self, profile: &FounderProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO founders (founder_key, canonical_key, name, source_api, linkedin_url, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (founder_key) DO UPDATE SET
                canonical_key = EXCLUDED.canonical_key,
                name = EXCLUDED.name,
                source_api = EXCLUDED.source_api,
                linkedin_url = EXCLUDED.linkedin_url,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&profile.founder_key)
        .bind(&profile.canonical_key)
        .bind(&profile.name)
        .bind(&profile.source_api)
        .bind(&profile.linkedin_url)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_founder(&self, founder_key: &str) -> Result<Option<FounderProfile>> {
        let row = sqlx::query_as::<_, FounderProfile>(
            r#"
            SELECT founder_key, canonical_key, name, source_api, linkedin_url, updated_at
            FROM founders
            WHERE founder_key = $1
            "#,
        )
        .bind(founder_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Reverse lookup used by the verification gate: does any founder link
    /// to this company at all? Picks the most recently synced row when a
    /// canonical key has more than one founder.
    pub async fn get_founder_by_canonical_key(&self, canonical_key: &str) -> Result<Option<FounderProfile>> {
        let row = sqlx::query_as::<_, FounderProfile>(
            r#"
            SELECT founder_key, canonical_key, name, source_api, linkedin_url, updated_at
            FROM founders
            WHERE canonical_key = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(canonical_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

// ---------------------------------------------------------------------------
// sqlx::FromRow impls
// ---------------------------------------------------------------------------

impl<'r> sqlx::FromRow<'r, PgRow> for Signal {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        let status_str: String = row.try_get("processing_status")?;
        Ok(Signal {
            id: row.try_get("id")?,
            signal_type: row.try_get("signal_type")?,
            source_api: row.try_get("source_api")?,
            canonical_key: row.try_get("canonical_key")?,
            confidence: row.try_get("confidence")?,
            raw_data: row.try_get("raw_data")?,
            company_name: row.try_get("company_name")?,
            detected_at: row.try_get("detected_at")?,
            created_at: row.try_get("created_at")?,
            processing_status: status_str.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))?,
            crm_page_id: row.try_get("crm_page_id")?,
            error_message: row.try_get("error_message")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for SourceAsset {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(SourceAsset {
            id: row.try_get("id")?,
            source_type: row.try_get("source_type")?,
            external_id: row.try_get("external_id")?,
            raw_payload: row.try_get("raw_payload")?,
            fetched_at: row.try_get("fetched_at")?,
            change_detected: row.try_get("change_detected")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for AssetToLead {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        let resolved_by_str: String = row.try_get("resolved_by")?;
        Ok(AssetToLead {
            asset_id: row.try_get("asset_id")?,
            source_type: row.try_get("source_type")?,
            external_id: row.try_get("external_id")?,
            lead_canonical_key: row.try_get("lead_canonical_key")?,
            confidence: row.try_get("confidence")?,
            resolved_by: resolved_by_str.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))?,
            resolved_at: row.try_get("resolved_at")?,
            metadata: row.try_get("metadata")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for SuppressionEntry {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(SuppressionEntry {
            canonical_key: row.try_get("canonical_key")?,
            crm_page_id: row.try_get("crm_page_id")?,
            crm_status: row.try_get("crm_status")?,
            company_name: row.try_get("company_name")?,
            synced_at: row.try_get("synced_at")?,
            expires_at: row.try_get("expires_at")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for OutboxEntry {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        let status_str: String = row.try_get("status")?;
        Ok(OutboxEntry {
            id: row.try_get("id")?,
            payload: row.try_get("payload")?,
            signal_ids: row.try_get("signal_ids")?,
            status: status_str.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))?,
            attempts: row.try_get("attempts")?,
            next_attempt_at: row.try_get("next_attempt_at")?,
            last_error: row.try_get("last_error")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for PipelineRun {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(PipelineRun {
            run_id: row.try_get("run_id")?,
            started_at: row.try_get("started_at")?,
            completed_at: row.try_get("completed_at")?,
            stats: row.try_get("stats")?,
            errors: row.try_get("errors")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for FounderProfile {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(FounderProfile {
            founder_key: row.try_get("founder_key")?,
            canonical_key: row.try_get("canonical_key")?,
            name: row.try_get("name")?,
            source_api: row.try_get("source_api")?,
            linkedin_url: row.try_get("linkedin_url")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Test utilities
// ---------------------------------------------------------------------------

#[cfg(feature = "test-utils")]
impl Store {
    /// Wipe all tables (tests only).
    pub async fn truncate_all(&self) -> Result<()> {
        sqlx::query(
            r#"
            TRUNCATE signals, suppression_cache, source_assets, asset_to_lead,
                     crm_outbox, pipeline_runs, founders
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
