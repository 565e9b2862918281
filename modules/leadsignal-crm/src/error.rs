use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("CRM request failed: {0}")]
    Request(String),
    #[error("CRM returned an unexpected response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Store(#[from] leadsignal_store::StoreError),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CrmError>;
