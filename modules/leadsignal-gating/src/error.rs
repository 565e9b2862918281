use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatingError {
    #[error("classifier backend error: {0}")]
    Backend(String),

    #[error("failed to parse classifier response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GatingError>;
