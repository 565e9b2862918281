use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use leadsignal_collector::Collector;
use leadsignal_crm::{CrmConnector, FounderSync, FounderSyncConfig, InvestmentStage, OutboxWorker, OutboxWorkerConfig, ProspectPayload, SuppressionSync};
use leadsignal_gating::SignalProcessor;
use leadsignal_resolver::{EntityResolver, ResolutionMethod};
use leadsignal_store::{ResolvedBy, Signal, Store};
use leadsignal_verify::{founder_score, compute_velocity, FounderScoringConfig, PushDecision, VerificationGate};

use crate::error::Result;
use crate::health::{HealthMonitorConfig, HealthReport, SignalHealthMonitor};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub use_entity_resolution: bool,
    pub use_gating: bool,
    pub use_founder_scoring: bool,
    pub use_velocity_scoring: bool,
    pub suppression_ttl_days: i64,
    pub resolver_min_confidence: f64,
    pub collectors_parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            use_entity_resolution: true,
            use_gating: false,
            use_founder_scoring: false,
            use_velocity_scoring: false,
            suppression_ttl_days: 7,
            resolver_min_confidence: 0.5,
            collectors_parallel: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub run_id: Option<Uuid>,
    pub collectors_run: u32,
    pub signals_found: u32,
    pub signals_new: u32,
    pub signals_suppressed: u32,
    pub groups_processed: u32,
    pub auto_pushed: u32,
    pub needs_review: u32,
    pub held: u32,
    pub rejected: u32,
    pub errors: Vec<String>,
}

/// Shared, cloneable dependency bundle for one pipeline invocation. Built
/// once per process; each run constructs its per-invocation state (the
/// verification gate, the signal processor) from these.
pub struct PipelineDeps {
    pub store: Arc<Store>,
    pub crm: Arc<dyn CrmConnector>,
    pub collectors: Vec<Arc<dyn Collector>>,
    pub resolver: EntityResolver,
    pub founder_config: FounderScoringConfig,
    pub config: PipelineConfig,
}

/// Single entry point tying together collection, entity resolution,
/// two-stage gating, verification, and CRM routing for one run.
pub async fn run_full_pipeline(
    deps: &PipelineDeps,
    collector_names: &[String],
    dry_run: bool,
    mut gating: Option<SignalProcessor>,
    verify_gate: &VerificationGate,
) -> Result<PipelineStats> {
    let started_at = Utc::now();
    let mut stats = PipelineStats::default();

    if let Err(e) = SuppressionSync::new(deps.store.clone(), deps.crm.clone(), deps.config.suppression_ttl_days).sync(false).await {
        tracing::warn!(error = %e, "suppression cache warmup failed, continuing");
    }

    let selected: Vec<&Arc<dyn Collector>> =
        deps.collectors.iter().filter(|c| collector_names.is_empty() || collector_names.iter().any(|n| n == c.collector_name())).collect();

    let results = if deps.config.collectors_parallel {
        let futures = selected.iter().map(|c| leadsignal_collector::run(c.as_ref(), &deps.store, dry_run));
        futures::future::join_all(futures).await
    } else {
        let mut out = Vec::new();
        for c in &selected {
            out.push(leadsignal_collector::run(c.as_ref(), &deps.store, dry_run).await);
        }
        out
    };

    for result in &results {
        stats.collectors_run += 1;
        stats.signals_found += result.signals_found;
        stats.signals_new += result.signals_new;
        stats.signals_suppressed += result.signals_suppressed;
        for err in &result.errors {
            push_error(&mut stats.errors, format!("{}: {err}", result.collector_name));
        }
    }

    if deps.config.use_entity_resolution {
        if let Err(e) = resolve_unresolved_assets(deps).await {
            push_error(&mut stats.errors, format!("entity resolution pass failed: {e}"));
        }
    }

    if !dry_run {
        let pending = deps.store.get_pending_signals(None, None).await?;
        let mut groups: HashMap<String, Vec<Signal>> = HashMap::new();
        for signal in pending {
            groups.entry(signal.canonical_key.clone()).or_default().push(signal);
        }

        if deps.config.use_entity_resolution {
            groups = regroup_by_resolved_links(&deps.store, groups, deps.config.resolver_min_confidence).await?;
        }

        for (canonical_key, signals) in groups {
            stats.groups_processed += 1;

            if deps.config.use_gating {
                if let Some(processor) = gating.as_mut() {
                    if !group_clears_gate(processor, &signals).await {
                        continue;
                    }
                }
            }

            let founder = if deps.config.use_founder_scoring {
                let profile = deps.store.get_founder_by_canonical_key(&canonical_key).await?;
                founder_score(profile.is_some(), false, false, &deps.founder_config)
            } else {
                None
            };

            let velocity = if deps.config.use_velocity_scoring {
                let sample = compute_velocity(&signals, Utc::now());
                (Some(sample.velocity_boost), Some(sample.momentum_score))
            } else {
                (None, None)
            };

            let result = verify_gate.evaluate(&signals, founder, velocity.0, velocity.1);

            match result.decision {
                PushDecision::AutoPush | PushDecision::NeedsReview => {
                    if result.decision == PushDecision::AutoPush {
                        stats.auto_pushed += 1;
                    } else {
                        stats.needs_review += 1;
                    }
                    let payload = build_prospect_payload(&canonical_key, &signals, &result);
                    let signal_ids: Vec<i64> = signals.iter().map(|s| s.id).collect();
                    let envelope = json!({ "prospect": payload, "metadata": { "reason": result.reason } });
                    deps.store.enqueue(envelope, &signal_ids).await?;
                }
                PushDecision::Hold => stats.held += 1,
                PushDecision::Reject => {
                    stats.rejected += 1;
                    for signal in &signals {
                        deps.store.mark_rejected(signal.id, &result.reason, None).await?;
                    }
                }
            }
        }
    }

    let health = match SignalHealthMonitor::new(deps.store.clone(), HealthMonitorConfig::default()).generate_report().await {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::warn!(error = %e, "health monitor failed, continuing");
            None
        }
    };

    let completed_at = Utc::now();
    let run_id = deps
        .store
        .save_pipeline_run(started_at, Some(completed_at), pipeline_stats_json(&stats, health.as_ref()), &stats.errors)
        .await?;
    stats.run_id = Some(run_id);

    tracing::info!(
        run_id = %run_id,
        signals_new = stats.signals_new,
        auto_pushed = stats.auto_pushed,
        needs_review = stats.needs_review,
        rejected = stats.rejected,
        "pipeline run complete"
    );

    Ok(stats)
}

pub async fn run_outbox_drain(store: Arc<Store>, crm: Arc<dyn CrmConnector>, limit: i64) -> Result<leadsignal_crm::DrainStats> {
    Ok(OutboxWorker::new(store, crm, OutboxWorkerConfig::default()).drain(limit).await?)
}

pub async fn run_suppression_sync(store: Arc<Store>, crm: Arc<dyn CrmConnector>, ttl_days: i64, dry_run: bool) -> Result<leadsignal_crm::SyncStats> {
    Ok(SuppressionSync::new(store, crm, ttl_days).sync(dry_run).await?)
}

pub async fn run_founder_sync(store: Arc<Store>, crm: Arc<dyn CrmConnector>, config: FounderSyncConfig) -> Result<leadsignal_crm::FounderSyncStats> {
    Ok(FounderSync::new(store, crm, config).run().await?)
}

pub async fn run_health_scan(store: Arc<Store>) -> Result<HealthReport> {
    Ok(SignalHealthMonitor::new(store, HealthMonitorConfig::default()).generate_report().await?)
}

/// Re-groups signals whose raw payload carries a `(source_type, external_id)`
/// pair already resolved to a different lead by an `AssetToLead` link.
/// Signals with no such pair, or with no resolved link above the
/// confidence threshold, stay in their original bucket.
pub async fn regroup_by_resolved_links(
    store: &Store,
    groups: HashMap<String, Vec<Signal>>,
    min_confidence: f64,
) -> Result<HashMap<String, Vec<Signal>>> {
    let mut regrouped: HashMap<String, Vec<Signal>> = HashMap::new();
    for (canonical_key, signals) in groups {
        for signal in signals {
            let asset_ref = signal
                .raw_data
                .get("source_type")
                .and_then(|v| v.as_str())
                .zip(signal.raw_data.get("external_id").and_then(|v| v.as_str()));

            let target = match asset_ref {
                Some((source_type, external_id)) => store
                    .get_lead_for_asset(source_type, external_id, min_confidence)
                    .await?
                    .unwrap_or_else(|| canonical_key.clone()),
                None => canonical_key.clone(),
            };
            regrouped.entry(target).or_default().push(signal);
        }
    }
    Ok(regrouped)
}

async fn resolve_unresolved_assets(deps: &PipelineDeps) -> Result<()> {
    let unresolved = deps.store.get_unresolved_assets(200).await?;
    for asset in unresolved {
        let Some(candidate) = deps.resolver.get_best_candidate(&asset, deps.config.resolver_min_confidence) else {
            continue;
        };
        let link = leadsignal_store::AssetToLead {
            asset_id: asset.id,
            source_type: asset.source_type.clone(),
            external_id: asset.external_id.clone(),
            lead_canonical_key: candidate.lead_canonical_key,
            confidence: candidate.confidence,
            resolved_by: resolved_by_of(candidate.method),
            resolved_at: Utc::now(),
            metadata: Some(serde_json::Value::Object(candidate.metadata)),
        };
        deps.store.create_link(&link).await?;
    }
    Ok(())
}

fn resolved_by_of(method: ResolutionMethod) -> ResolvedBy {
    match method {
        ResolutionMethod::DomainMatch => ResolvedBy::DomainMatch,
        ResolutionMethod::OrgMatch => ResolvedBy::OrgMatch,
        ResolutionMethod::NameSimilarity => ResolvedBy::NameSimilarity,
        ResolutionMethod::Heuristic => ResolvedBy::Heuristic,
    }
}

/// Returns `true` if the group should proceed to verification. A group with
/// no gateable signals (no `previous_snapshot` anywhere) always proceeds;
/// gating only holds back a group whose only triggered signals classified
/// as non-actionable.
async fn group_clears_gate(processor: &mut SignalProcessor, signals: &[Signal]) -> bool {
    let mut saw_trigger = false;
    let mut saw_actionable = false;

    for signal in signals {
        if signal.raw_data.get("previous_snapshot").is_none() {
            continue;
        }
        let result = processor.process_signal(&signal.id.to_string(), &signal.raw_data).await;
        if result.triggered {
            saw_trigger = true;
            if result.is_actionable() {
                saw_actionable = true;
            }
        }
    }

    !saw_trigger || saw_actionable
}

fn build_prospect_payload(canonical_key: &str, signals: &[Signal], result: &leadsignal_verify::VerificationResult) -> ProspectPayload {
    let company_name = signals.iter().find_map(|s| s.company_name.clone()).unwrap_or_else(|| canonical_key.to_string());
    let website = canonical_key.strip_prefix("domain:").map(|d| format!("https://{d}")).unwrap_or_default();
    let mut signal_types: Vec<String> = signals.iter().map(|s| s.signal_type.clone()).collect();
    signal_types.sort();
    signal_types.dedup();

    ProspectPayload {
        discovery_id: Uuid::new_v4().to_string(),
        company_name,
        canonical_key: canonical_key.to_string(),
        canonical_key_candidates: vec![canonical_key.to_string()],
        stage: InvestmentStage::PreSeed,
        status: result.suggested_crm_status.to_string(),
        website,
        confidence_score: result.confidence_score,
        signal_types,
        why_now: result.reason.clone(),
        short_description: String::new(),
        sector: None,
        proposed_sector: None,
        taxonomy_status: None,
        founder_name: String::new(),
        founder_linkedin: String::new(),
        location: String::new(),
        target_raise: String::new(),
        external_refs: Default::default(),
        watchlists_matched: Vec::new(),
    }
}

fn pipeline_stats_json(stats: &PipelineStats, health: Option<&HealthReport>) -> serde_json::Value {
    json!({
        "collectors_run": stats.collectors_run,
        "signals_found": stats.signals_found,
        "signals_new": stats.signals_new,
        "signals_suppressed": stats.signals_suppressed,
        "groups_processed": stats.groups_processed,
        "auto_pushed": stats.auto_pushed,
        "needs_review": stats.needs_review,
        "held": stats.held,
        "rejected": stats.rejected,
        "anomalies": health.map(|h| h.anomalies.len()).unwrap_or(0),
    })
}

const MAX_RETAINED_ERRORS: usize = 10;

fn push_error(errors: &mut Vec<String>, message: String) {
    if errors.len() < MAX_RETAINED_ERRORS {
        errors.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadsignal_verify::{ConfidenceBreakdown, VerificationStatus};

    fn result(decision: PushDecision) -> leadsignal_verify::VerificationResult {
        leadsignal_verify::VerificationResult {
            decision,
            verification_status: VerificationStatus::SingleSource,
            confidence_score: 0.42,
            confidence_breakdown: ConfidenceBreakdown {
                base_score: 0.42,
                multi_source_boost: 1.0,
                convergence_boost: 1.0,
                founder_score: None,
                founder_boost: 0.0,
                velocity_boost: 0.0,
                momentum_score: 0.0,
                signal_details: vec![],
            },
            reason: "test reason".to_string(),
            suggested_crm_status: "source",
            signals_used: 1,
            sources_checked: 1,
            verification_details: vec![],
        }
    }

    fn signal(signal_type: &str) -> Signal {
        Signal {
            id: 1,
            signal_type: signal_type.to_string(),
            source_api: "github".to_string(),
            canonical_key: "domain:acme.ai".to_string(),
            confidence: 0.5,
            raw_data: serde_json::json!({}),
            company_name: Some("Acme".to_string()),
            detected_at: Utc::now(),
            created_at: Utc::now(),
            processing_status: leadsignal_store::ProcessingStatus::Pending,
            crm_page_id: None,
            error_message: None,
        }
    }

    #[test]
    fn resolved_by_mapping_is_total() {
        assert_eq!(resolved_by_of(ResolutionMethod::DomainMatch), ResolvedBy::DomainMatch);
        assert_eq!(resolved_by_of(ResolutionMethod::OrgMatch), ResolvedBy::OrgMatch);
        assert_eq!(resolved_by_of(ResolutionMethod::NameSimilarity), ResolvedBy::NameSimilarity);
        assert_eq!(resolved_by_of(ResolutionMethod::Heuristic), ResolvedBy::Heuristic);
    }

    #[test]
    fn push_error_caps_retained_errors() {
        let mut errors = Vec::new();
        for i in 0..(MAX_RETAINED_ERRORS + 5) {
            push_error(&mut errors, format!("error {i}"));
        }
        assert_eq!(errors.len(), MAX_RETAINED_ERRORS);
    }

    #[test]
    fn prospect_payload_uses_sorted_deduped_signal_types() {
        let signals = vec![signal("hiring_signal"), signal("github_spike"), signal("hiring_signal")];
        let payload = build_prospect_payload("domain:acme.ai", &signals, &result(PushDecision::AutoPush));
        assert_eq!(payload.signal_types, vec!["github_spike".to_string(), "hiring_signal".to_string()]);
        assert_eq!(payload.company_name, "Acme");
        assert_eq!(payload.website, "https://acme.ai");
    }

    #[test]
    fn prospect_payload_falls_back_to_canonical_key_as_name() {
        let mut s = signal("incorporation");
        s.company_name = None;
        let payload = build_prospect_payload("companies_house:123", &[s], &result(PushDecision::NeedsReview));
        assert_eq!(payload.company_name, "companies_house:123");
        assert_eq!(payload.website, "");
    }

    #[test]
    fn pipeline_stats_json_reports_anomaly_count() {
        let stats = PipelineStats { auto_pushed: 2, rejected: 1, ..Default::default() };
        let json = pipeline_stats_json(&stats, None);
        assert_eq!(json["auto_pushed"], 2);
        assert_eq!(json["anomalies"], 0);
    }
}
