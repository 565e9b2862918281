mod harness;

use chrono::Utc;
use leadsignal_store::{AssetToLead, FounderProfile, NewSignal, ResolvedBy, SuppressionEntry};
use serde_json::json;

#[tokio::test]
async fn save_and_dedup_signal() {
    let (_container, store) = harness::postgres_store().await;

    let id = store
        .save_signal(NewSignal {
            signal_type: "github_spike".into(),
            source_api: "github".into(),
            canonical_key: "github_repo:acme/app".into(),
            confidence: 0.6,
            raw_data: json!({"stars": 120}),
            company_name: Some("Acme".into()),
            detected_at: None,
        })
        .await
        .unwrap();
    assert!(id > 0);

    assert!(store.is_duplicate("github_repo:acme/app").await.unwrap());
    assert!(!store.is_duplicate("github_repo:other/app").await.unwrap());

    let signals = store.get_signals_for_company("github_repo:acme/app").await.unwrap();
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].processing_status.to_string(), "pending");
}

#[tokio::test]
async fn mark_pushed_and_rejected_update_status() {
    let (_container, store) = harness::postgres_store().await;

    let pushed_id = store
        .save_signal(NewSignal {
            signal_type: "incorporation".into(),
            source_api: "companies_house".into(),
            canonical_key: "companies_house:12345678".into(),
            confidence: 0.8,
            raw_data: json!({}),
            company_name: None,
            detected_at: None,
        })
        .await
        .unwrap();

    let rejected_id = store
        .save_signal(NewSignal {
            signal_type: "hiring_signal".into(),
            source_api: "job_postings".into(),
            canonical_key: "domain:acme.ai".into(),
            confidence: 0.3,
            raw_data: json!({}),
            company_name: None,
            detected_at: None,
        })
        .await
        .unwrap();

    store.mark_pushed(pushed_id, "crm-page-1", None).await.unwrap();
    store.mark_rejected(rejected_id, "below threshold", None).await.unwrap();

    let pending = store.get_pending_signals(None, None).await.unwrap();
    assert!(pending.is_empty());

    let pushed = store
        .get_signals_for_company("companies_house:12345678")
        .await
        .unwrap();
    assert_eq!(pushed[0].processing_status.to_string(), "pushed");
    assert_eq!(pushed[0].crm_page_id.as_deref(), Some("crm-page-1"));
}

#[tokio::test]
async fn suppression_entries_expire_by_ttl() {
    let (_container, store) = harness::postgres_store().await;

    let entry = SuppressionEntry {
        canonical_key: "domain:acme.ai".into(),
        crm_page_id: "crm-page-9".into(),
        crm_status: "source".into(),
        company_name: Some("Acme".into()),
        synced_at: Utc::now() - chrono::Duration::days(10),
        expires_at: Utc::now(), // overwritten by ttl in add_suppression
    };

    store.add_suppression(&entry, 7).await.unwrap();

    // synced_at + 7 days is already in the past, so this key should read as absent.
    assert!(store.check_suppression("domain:acme.ai").await.unwrap().is_none());

    let cleared = store.clear_expired_suppressions().await.unwrap();
    assert_eq!(cleared, 1);
}

#[tokio::test]
async fn asset_to_lead_precedence_rules() {
    let (_container, store) = harness::postgres_store().await;

    let heuristic_link = AssetToLead {
        asset_id: 1,
        source_type: "github".into(),
        external_id: "acme/app".into(),
        lead_canonical_key: "name_loc:acme".into(),
        confidence: 0.4,
        resolved_by: ResolvedBy::Heuristic,
        resolved_at: Utc::now(),
        metadata: None,
    };
    store.create_link(&heuristic_link).await.unwrap();

    let weaker_domain_link = AssetToLead {
        confidence: 0.3,
        resolved_by: ResolvedBy::DomainMatch,
        lead_canonical_key: "domain:acme.ai".into(),
        ..heuristic_link.clone()
    };
    store.create_link(&weaker_domain_link).await.unwrap();

    let resolved = store
        .get_lead_for_asset("github", "acme/app", 0.0)
        .await
        .unwrap();
    assert_eq!(resolved.as_deref(), Some("name_loc:acme"));

    let stronger_domain_link = AssetToLead {
        confidence: 0.9,
        resolved_by: ResolvedBy::DomainMatch,
        lead_canonical_key: "domain:acme.ai".into(),
        ..heuristic_link.clone()
    };
    store.create_link(&stronger_domain_link).await.unwrap();

    let resolved = store
        .get_lead_for_asset("github", "acme/app", 0.0)
        .await
        .unwrap();
    assert_eq!(resolved.as_deref(), Some("domain:acme.ai"));

    let manual_link = AssetToLead {
        confidence: 0.1,
        resolved_by: ResolvedBy::Manual,
        lead_canonical_key: "domain:acme-manual.ai".into(),
        ..heuristic_link.clone()
    };
    store.create_link(&manual_link).await.unwrap();

    let attempted_override = AssetToLead {
        confidence: 0.99,
        resolved_by: ResolvedBy::DomainMatch,
        lead_canonical_key: "domain:should-not-win.ai".into(),
        ..heuristic_link
    };
    store.create_link(&attempted_override).await.unwrap();

    let resolved = store
        .get_lead_for_asset("github", "acme/app", 0.0)
        .await
        .unwrap();
    assert_eq!(resolved.as_deref(), Some("domain:acme-manual.ai"));
}

#[tokio::test]
async fn source_asset_snapshots_track_latest_and_previous() {
    let (_container, store) = harness::postgres_store().await;

    store
        .save_asset("github", "acme/app", &json!({"stars": 10}), false)
        .await
        .unwrap();
    // Postgres timestamp resolution is sub-millisecond; a short sleep keeps
    // fetched_at ordering deterministic across the two inserts.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    store
        .save_asset("github", "acme/app", &json!({"stars": 25}), true)
        .await
        .unwrap();

    let latest = store.get_latest_snapshot("github", "acme/app").await.unwrap().unwrap();
    assert_eq!(latest.raw_payload["stars"], 25);
    assert!(latest.change_detected);

    let previous = store.get_previous_snapshot("github", "acme/app").await.unwrap().unwrap();
    assert_eq!(previous.raw_payload["stars"], 10);

    assert_eq!(store.get_snapshot_count("github", "acme/app").await.unwrap(), 2);

    let changed = store.get_assets_with_changes(10).await.unwrap();
    assert_eq!(changed.len(), 1);
}

#[tokio::test]
async fn outbox_enqueue_and_backoff() {
    let (_container, store) = harness::postgres_store().await;

    let id = store.enqueue(json!({"company": "Acme"}), &[1, 2]).await.unwrap();

    let pending = store.get_pending_outbox(10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, id);

    store.mark_outbox_failed(id, "timeout", 300).await.unwrap();
    let pending = store.get_pending_outbox(10).await.unwrap();
    assert!(pending.is_empty(), "entry should not be retried before its backoff elapses");

    store.mark_outbox_sent(id).await.unwrap();
    let pending = store.get_pending_outbox(10).await.unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn founder_store_upserts_by_founder_key() {
    let (_container, store) = harness::postgres_store().await;

    let profile = FounderProfile {
        founder_key: "linkedin:jane-doe".into(),
        canonical_key: "domain:acme.ai".into(),
        name: "Jane Doe".into(),
        source_api: "crm".into(),
        linkedin_url: "https://linkedin.com/in/jane-doe".into(),
        updated_at: Utc::now(),
    };
    store.save_founder(&profile).await.unwrap();

    let relinked = FounderProfile {
        canonical_key: "domain:acme-2.ai".into(),
        ..profile.clone()
    };
    store.save_founder(&relinked).await.unwrap();

    let fetched = store.get_founder("linkedin:jane-doe").await.unwrap().unwrap();
    assert_eq!(fetched.canonical_key, "domain:acme-2.ai");

    let by_canonical = store.get_founder_by_canonical_key("domain:acme-2.ai").await.unwrap().unwrap();
    assert_eq!(by_canonical.founder_key, "linkedin:jane-doe");
    assert!(store.get_founder_by_canonical_key("domain:no-such-company.ai").await.unwrap().is_none());
}

#[tokio::test]
async fn pipeline_run_round_trips() {
    let (_container, store) = harness::postgres_store().await;

    let started = Utc::now();
    let run_id = store
        .save_pipeline_run(started, Some(started), json!({"signals_found": 12}), &[])
        .await
        .unwrap();

    let run = store.get_pipeline_run(run_id).await.unwrap().unwrap();
    assert_eq!(run.stats["signals_found"], 12);

    let runs = store.get_pipeline_runs(10).await.unwrap();
    assert_eq!(runs.len(), 1);
}
