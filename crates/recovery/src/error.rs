use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecoveryError>;

#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("Store error: {0}")]
    Store(#[from] faxgate_store::StoreError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Other(String),
}
