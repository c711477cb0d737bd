//! Error types for the service layer

use custody_storage::StorageError;
use custody_types::{CustodyError, PoolId};

/// Errors surfaced by [`crate::PoolService`] and configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Custody(#[from] CustodyError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Pool not found: {0}")]
    PoolNotFound(PoolId),

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

impl ServiceError {
    /// The underlying custody error, if this is one
    pub fn as_custody(&self) -> Option<&CustodyError> {
        match self {
            Self::Custody(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
