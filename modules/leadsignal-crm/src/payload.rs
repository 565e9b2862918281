use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Structured record sent to the external CRM for one prospect. Mirrors the
/// connector-facing payload shape, independent of any one CRM's field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProspectPayload {
    pub discovery_id: String,
    pub company_name: String,
    pub canonical_key: String,
    #[serde(default)]
    pub canonical_key_candidates: Vec<String>,
    pub stage: InvestmentStage,
    pub status: String,
    #[serde(default)]
    pub website: String,
    pub confidence_score: f64,
    #[serde(default)]
    pub signal_types: Vec<String>,
    #[serde(default)]
    pub why_now: String,
    #[serde(default)]
    pub short_description: String,
    pub sector: Option<String>,
    pub proposed_sector: Option<String>,
    pub taxonomy_status: Option<String>,
    #[serde(default)]
    pub founder_name: String,
    #[serde(default)]
    pub founder_linkedin: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub target_raise: String,
    #[serde(default)]
    pub external_refs: HashMap<String, Json>,
    #[serde(default)]
    pub watchlists_matched: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentStage {
    PreSeed,
    Seed,
    SeriesA,
    Later,
}

impl Default for InvestmentStage {
    fn default() -> Self {
        Self::PreSeed
    }
}

/// Outcome of one `upsert_prospect` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertResult {
    pub status: UpsertStatus,
    pub page_id: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertStatus {
    Created,
    Updated,
    Skipped,
}

/// One record enumerated from the external CRM during a suppression sync.
#[derive(Debug, Clone)]
pub struct CrmRecord {
    pub page_id: String,
    pub canonical_key: Option<String>,
    pub website: Option<String>,
    pub status: String,
    pub company_name: Option<String>,
    pub founder_linkedin_urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn investment_stage_defaults_to_pre_seed() {
        assert_eq!(InvestmentStage::default(), InvestmentStage::PreSeed);
    }
}
