use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use leadsignal_collector::Collector;
use leadsignal_common::Config;
use leadsignal_crm::{CrmConnector, FounderSyncConfig, NotionConnector, OutboxWorkerConfig};
use leadsignal_gating::{ClassifierConfig, LlmClassifierV2, ProcessorConfig, SignalProcessor};
use leadsignal_orchestrator::{run_founder_sync, run_health_scan, run_outbox_drain, run_suppression_sync, PipelineConfig, PipelineDeps};
use leadsignal_resolver::{EntityResolver, ResolverConfig};
use leadsignal_store::Store;
use leadsignal_verify::{FounderScoringConfig, VerificationGate, VerificationGateConfig};

#[derive(Parser)]
#[command(name = "leadsignal", about = "Operator CLI for the deal-sourcing discovery pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: collect, resolve, gate, verify, route to CRM.
    Full {
        #[arg(long)]
        collectors: Vec<String>,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        gating: bool,
        #[arg(long, default_value_t = true)]
        entity_resolution: bool,
        #[arg(long)]
        founder_scoring: bool,
        #[arg(long)]
        velocity_scoring: bool,
        #[arg(long)]
        strict_mode: bool,
    },
    /// Run only the source collectors, without verification or CRM routing.
    Collect {
        #[arg(long)]
        collectors: Vec<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Drain the CRM outbox queue.
    Process {
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
    /// Refresh the suppression cache and sync founder links from the CRM.
    Sync {
        #[arg(long)]
        dry_run: bool,
    },
    /// Print signal and suppression counts.
    Stats,
    /// Print the source health report.
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("leadsignal=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Full { collectors, dry_run, gating, entity_resolution, founder_scoring, velocity_scoring, strict_mode } => {
            let config = Config::from_env();
            config.log_redacted();
            let store = Arc::new(connect_store(&config.database_url).await?);

            let github = leadsignal_collector::adapters::github::GithubAdapter::new((*store).clone(), &config.github_token, Vec::new());
            let product_hunt = leadsignal_collector::adapters::product_hunt::ProductHuntAdapter::new(&config.product_hunt_token);
            let all_collectors: Vec<Arc<dyn Collector>> = vec![Arc::new(github), Arc::new(product_hunt)];

            let crm: Arc<dyn CrmConnector> = Arc::new(NotionConnector::new(config.crm_api_key.clone(), config.crm_database_id.clone()));
            let resolver = EntityResolver::new(ResolverConfig::default());

            let deps = PipelineDeps {
                store: store.clone(),
                crm,
                collectors: all_collectors,
                resolver,
                founder_config: FounderScoringConfig::default(),
                config: PipelineConfig {
                    use_entity_resolution: entity_resolution,
                    use_gating: gating,
                    use_founder_scoring: founder_scoring,
                    use_velocity_scoring: velocity_scoring,
                    suppression_ttl_days: config.suppression_ttl_days,
                    ..PipelineConfig::default()
                },
            };

            let processor = gating.then(|| {
                let backend = Box::new(leadsignal_gating::AnthropicBackend::new(config.llm_api_key.clone(), config.llm_model.clone()));
                let classifier = LlmClassifierV2::new(ClassifierConfig { model: config.llm_model.clone(), ..ClassifierConfig::default() }, backend);
                SignalProcessor::new(ProcessorConfig { dry_run, ..ProcessorConfig::default() }, classifier)
            });

            let gate = VerificationGate::new(VerificationGateConfig {
                use_founder_scoring: founder_scoring,
                use_velocity_scoring: velocity_scoring,
                strict_mode,
                ..VerificationGateConfig::default()
            });

            let stats = leadsignal_orchestrator::run_full_pipeline(&deps, &collectors, dry_run, processor, &gate).await?;
            info!(
                signals_new = stats.signals_new,
                auto_pushed = stats.auto_pushed,
                needs_review = stats.needs_review,
                rejected = stats.rejected,
                "run complete"
            );
        }
        Command::Collect { collectors, dry_run } => {
            let config = Config::collector_from_env();
            config.log_redacted();
            let store = connect_store(&config.database_url).await?;

            let github = leadsignal_collector::adapters::github::GithubAdapter::new(store.clone(), &config.github_token, Vec::new());
            let product_hunt = leadsignal_collector::adapters::product_hunt::ProductHuntAdapter::new(&config.product_hunt_token);
            let all: Vec<Box<dyn Collector>> = vec![Box::new(github), Box::new(product_hunt)];

            for collector in all.iter().filter(|c| collectors.is_empty() || collectors.iter().any(|n| n == c.collector_name())) {
                let result = leadsignal_collector::run(collector.as_ref(), &store, dry_run).await;
                info!(collector = %result.collector_name, found = result.signals_found, new = result.signals_new, "collector finished");
            }
        }
        Command::Process { limit } => {
            let config = Config::crm_worker_from_env();
            config.log_redacted();
            let store = Arc::new(connect_store(&config.database_url).await?);
            let crm: Arc<dyn CrmConnector> = Arc::new(NotionConnector::new(config.crm_api_key.clone(), config.crm_database_id.clone()));
            let stats = run_outbox_drain(store, crm, limit).await?;
            info!(sent = stats.sent, failed = stats.failed, "outbox drained");
        }
        Command::Sync { dry_run } => {
            let config = Config::crm_worker_from_env();
            config.log_redacted();
            let store = Arc::new(connect_store(&config.database_url).await?);
            let crm: Arc<dyn CrmConnector> = Arc::new(NotionConnector::new(config.crm_api_key.clone(), config.crm_database_id.clone()));

            let sync_stats = run_suppression_sync(store.clone(), crm.clone(), config.suppression_ttl_days, dry_run).await?;
            info!(entries_synced = sync_stats.entries_synced, entries_expired_cleared = sync_stats.entries_expired_cleared, "suppression sync complete");

            let founder_stats = run_founder_sync(store, crm, FounderSyncConfig { dry_run, ..FounderSyncConfig::default() }).await?;
            info!(founders_synced = founder_stats.founders_synced, founders_conflicts = founder_stats.founders_conflicts, "founder sync complete");
        }
        Command::Stats => {
            let config = Config::migrate_from_env();
            let store = connect_store(&config.database_url).await?;
            let stats = store.get_stats().await?;
            let suppression = store.get_suppression_stats().await?;
            println!("signals_by_status: {:?}", stats.signals_by_status);
            println!("signals_by_type: {:?}", stats.signals_by_type);
            println!("active_suppression_count: {}", stats.active_suppression_count);
            println!("suppression total/active/expired: {}/{}/{}", suppression.total_entries, suppression.active_entries, suppression.expired_entries);
        }
        Command::Health => {
            let config = Config::migrate_from_env();
            let store = Arc::new(connect_store(&config.database_url).await?);
            let report = run_health_scan(store).await?;
            println!("total_pending: {}", report.total_pending);
            for source in &report.sources {
                println!("{}: {} signals, stale={}", source.source_api, source.signal_count, source.stale);
            }
            for anomaly in &report.anomalies {
                println!("anomaly[{:?}] {}: {}", anomaly.kind, anomaly.source_api, anomaly.message);
            }
        }
    }

    Ok(())
}

async fn connect_store(database_url: &str) -> Result<Store> {
    let pool = PgPoolOptions::new().max_connections(5).connect(database_url).await?;
    Ok(Store::new(pool))
}
