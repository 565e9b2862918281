use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Pushed,
    Rejected,
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Pushed => "pushed",
            ProcessingStatus::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ProcessingStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "pushed" => Ok(Self::Pushed),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown processing status: {other}")),
        }
    }
}

/// A single observation from one source about one (approximate) company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: i64,
    pub signal_type: String,
    pub source_api: String,
    pub canonical_key: String,
    pub confidence: f64,
    pub raw_data: Json,
    pub company_name: Option<String>,
    pub detected_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub processing_status: ProcessingStatus,
    pub crm_page_id: Option<String>,
    pub error_message: Option<String>,
}

/// A new signal not yet assigned an id, confidence, or timestamps by the store.
#[derive(Debug, Clone)]
pub struct NewSignal {
    pub signal_type: String,
    pub source_api: String,
    pub canonical_key: String,
    pub confidence: f64,
    pub raw_data: Json,
    pub company_name: Option<String>,
    pub detected_at: Option<DateTime<Utc>>,
}

/// A raw snapshot of an upstream entity at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceAsset {
    pub id: i64,
    pub source_type: String,
    pub external_id: String,
    pub raw_payload: Json,
    pub fetched_at: DateTime<Utc>,
    pub change_detected: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedBy {
    DomainMatch,
    OrgMatch,
    NameSimilarity,
    Heuristic,
    Manual,
}

impl fmt::Display for ResolvedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResolvedBy::DomainMatch => "domain_match",
            ResolvedBy::OrgMatch => "org_match",
            ResolvedBy::NameSimilarity => "name_similarity",
            ResolvedBy::Heuristic => "heuristic",
            ResolvedBy::Manual => "manual",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ResolvedBy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domain_match" => Ok(Self::DomainMatch),
            "org_match" => Ok(Self::OrgMatch),
            "name_similarity" => Ok(Self::NameSimilarity),
            "heuristic" => Ok(Self::Heuristic),
            "manual" => Ok(Self::Manual),
            other => Err(format!("unknown resolution method: {other}")),
        }
    }
}

impl ResolvedBy {
    /// Manual links always outrank automated ones, regardless of confidence.
    pub fn is_manual(self) -> bool {
        matches!(self, ResolvedBy::Manual)
    }
}

/// A link from a `SourceAsset` to a canonical lead key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetToLead {
    pub asset_id: i64,
    pub source_type: String,
    pub external_id: String,
    pub lead_canonical_key: String,
    pub confidence: f64,
    pub resolved_by: ResolvedBy,
    pub resolved_at: DateTime<Utc>,
    pub metadata: Option<Json>,
}

/// Cache of canonical keys already present in the external CRM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressionEntry {
    pub canonical_key: String,
    pub crm_page_id: String,
    pub crm_status: String,
    pub company_name: Option<String>,
    pub synced_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SuppressionEntry {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    Pending,
    Sent,
    Failed,
}

impl fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::Sent => "sent",
            OutboxStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OutboxStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown outbox status: {other}")),
        }
    }
}

/// A durable queued write to the CRM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: i64,
    pub payload: Json,
    pub signal_ids: Vec<i64>,
    pub status: OutboxStatus,
    pub attempts: i32,
    pub next_attempt_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-run telemetry for a full pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub stats: Json,
    pub errors: Vec<String>,
}

/// A locally cached founder identity record, synced from the CRM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FounderProfile {
    pub founder_key: String,
    pub canonical_key: String,
    pub name: String,
    pub source_api: String,
    pub linkedin_url: String,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate counts returned by `Store::get_stats`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreStats {
    pub signals_by_type: std::collections::HashMap<String, i64>,
    pub signals_by_status: std::collections::HashMap<String, i64>,
    pub active_suppression_count: i64,
}

/// Aggregate counts returned by `Store::get_suppression_stats`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SuppressionStats {
    pub total_entries: i64,
    pub active_entries: i64,
    pub expired_entries: i64,
    pub by_status: std::collections::HashMap<String, i64>,
}
