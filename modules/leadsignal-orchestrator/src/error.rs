use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Store(#[from] leadsignal_store::StoreError),
    #[error(transparent)]
    Crm(#[from] leadsignal_crm::CrmError),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
