use thiserror::Error;

/// Shared error kind for concerns that don't belong to any single crate
/// (configuration, canonical-key parsing). Component crates (store,
/// collector, gating, resolver, verify, crm) define their own scoped error
/// enums and convert into or wrap `anyhow::Error` at their boundaries.
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid canonical key: {0}")]
    InvalidCanonicalKey(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
