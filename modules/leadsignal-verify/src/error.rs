use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("no signals supplied for canonical key")]
    NoSignals,
    #[error(transparent)]
    Store(#[from] leadsignal_store::StoreError),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
