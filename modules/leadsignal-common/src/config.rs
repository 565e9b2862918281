use std::env;

/// Application configuration loaded from environment variables. Each binary
/// (collector daemon, outbox/suppression worker, operator CLI) uses the
/// `*_from_env()` constructor for the fields it actually needs rather than
/// populating a single god-struct end to end.
#[derive(Debug, Clone)]
pub struct Config {
    // Store
    pub database_url: String,

    // LLM backend (gating classifier)
    pub llm_api_key: String,
    pub llm_model: String,

    // CRM connector
    pub crm_api_key: String,
    pub crm_database_id: String,

    // Source adapter credentials
    pub github_token: String,
    pub product_hunt_token: String,

    // Gating / entity resolution / verification toggles
    pub enable_gating: bool,
    pub enable_entity_resolution: bool,
    pub enable_founder_scoring: bool,
    pub enable_velocity_scoring: bool,
    pub strict_mode: bool,

    // Suppression sync
    pub suppression_ttl_days: i64,
}

impl Config {
    /// Load the full configuration. Panics with a clear message if a
    /// required variable is missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            llm_api_key: required_env("LLM_API_KEY"),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "claude-haiku-4-5".to_string()),
            crm_api_key: required_env("CRM_API_KEY"),
            crm_database_id: required_env("CRM_DATABASE_ID"),
            github_token: env::var("GITHUB_TOKEN").unwrap_or_default(),
            product_hunt_token: env::var("PRODUCT_HUNT_TOKEN").unwrap_or_default(),
            enable_gating: bool_env("ENABLE_GATING", true),
            enable_entity_resolution: bool_env("ENABLE_ENTITY_RESOLUTION", true),
            enable_founder_scoring: bool_env("ENABLE_FOUNDER_SCORING", true),
            enable_velocity_scoring: bool_env("ENABLE_VELOCITY_SCORING", true),
            strict_mode: bool_env("STRICT_MODE", false),
            suppression_ttl_days: int_env("SUPPRESSION_TTL_DAYS", 7),
        }
    }

    /// Load config for the migration runner (database connection only).
    pub fn migrate_from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            llm_api_key: String::new(),
            llm_model: String::new(),
            crm_api_key: String::new(),
            crm_database_id: String::new(),
            github_token: String::new(),
            product_hunt_token: String::new(),
            enable_gating: false,
            enable_entity_resolution: false,
            enable_founder_scoring: false,
            enable_velocity_scoring: false,
            strict_mode: false,
            suppression_ttl_days: int_env("SUPPRESSION_TTL_DAYS", 7),
        }
    }

    /// Load config for the collector daemon (store + source credentials;
    /// no CRM or LLM access needed).
    pub fn collector_from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            llm_api_key: String::new(),
            llm_model: String::new(),
            crm_api_key: String::new(),
            crm_database_id: String::new(),
            github_token: env::var("GITHUB_TOKEN").unwrap_or_default(),
            product_hunt_token: env::var("PRODUCT_HUNT_TOKEN").unwrap_or_default(),
            enable_gating: false,
            enable_entity_resolution: false,
            enable_founder_scoring: false,
            enable_velocity_scoring: false,
            strict_mode: false,
            suppression_ttl_days: int_env("SUPPRESSION_TTL_DAYS", 7),
        }
    }

    /// Load config for the outbox + suppression + founder sync worker
    /// (store + CRM; no source credentials or LLM access needed).
    pub fn crm_worker_from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            llm_api_key: String::new(),
            llm_model: String::new(),
            crm_api_key: required_env("CRM_API_KEY"),
            crm_database_id: required_env("CRM_DATABASE_ID"),
            github_token: String::new(),
            product_hunt_token: String::new(),
            enable_gating: false,
            enable_entity_resolution: false,
            enable_founder_scoring: false,
            enable_velocity_scoring: false,
            strict_mode: false,
            suppression_ttl_days: int_env("SUPPRESSION_TTL_DAYS", 7),
        }
    }
}

impl Config {
    /// Log the character count (never the value) of each secret-bearing
    /// field, so operators can confirm a secret is set without it ever
    /// reaching the logs.
    pub fn log_redacted(&self) {
        let vars = [
            ("DATABASE_URL", &self.database_url),
            ("LLM_API_KEY", &self.llm_api_key),
            ("CRM_API_KEY", &self.crm_api_key),
            ("GITHUB_TOKEN", &self.github_token),
            ("PRODUCT_HUNT_TOKEN", &self.product_hunt_token),
        ];
        for (name, value) in vars {
            if value.is_empty() {
                tracing::info!("{name} = (empty)");
            } else {
                tracing::info!("{name} = ({} chars)", value.len());
            }
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn bool_env(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn int_env(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
