use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate canonical key: {0}")]
    DuplicateKey(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
