use anyhow::Result;
use clap::{Parser, Subcommand};
use sha2::{Digest, Sha256};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use leadsignal_common::Config;

static MIGRATOR: Migrator = sqlx::migrate!("../leadsignal-store/migrations");

#[derive(Parser)]
#[command(name = "leadsignal-migrate", about = "Apply or inspect leadsignal Postgres migrations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply all pending migrations.
    Run,
    /// List applied and pending migrations without touching the database.
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("leadsignal=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::migrate_from_env();
    config.log_redacted();

    let fingerprint = migration_fingerprint();
    info!(migrations = MIGRATOR.migrations.len(), fingerprint = %fingerprint, "loaded migration set");

    match cli.command {
        Command::Run => {
            let pool = PgPoolOptions::new().max_connections(1).connect(&config.database_url).await?;
            MIGRATOR.run(&pool).await?;
            info!("migrations applied");
        }
        Command::Info => {
            for migration in MIGRATOR.migrations.iter() {
                info!(version = migration.version, description = %migration.description, "migration");
            }
        }
    }

    Ok(())
}

/// A sha256 over each migration's version and description, purely for the
/// startup log line — not used for integrity checks (sqlx already tracks
/// per-migration checksums in `_sqlx_migrations`).
fn migration_fingerprint() -> String {
    let mut hasher = Sha256::new();
    for migration in MIGRATOR.migrations.iter() {
        hasher.update(migration.version.to_string().as_bytes());
        hasher.update(migration.description.as_bytes());
    }
    format!("{:x}", hasher.finalize())[..12].to_string()
}
