//! Store error type.

use lightnode_types::ErrorKind;
use thiserror::Error;

/// Underlying I/O errors surface to callers as a single opaque store error;
/// callers (the Confirmer) log it and retry on the next tick.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(String),
    #[error("tx {0} violates monotonic status ordering: {1:?} -> {2:?}")]
    NonMonotonicStatus(String, lightnode_types::TxStatus, lightnode_types::TxStatus),
    #[error("serialization error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Store
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(e: redb::TransactionError) -> Self {
        StoreError::Redb(e.to_string())
    }
}

impl From<redb::TableError> for StoreError {
    fn from(e: redb::TableError) -> Self {
        StoreError::Redb(e.to_string())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(e: redb::StorageError) -> Self {
        StoreError::Redb(e.to_string())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(e: redb::CommitError) -> Self {
        StoreError::Redb(e.to_string())
    }
}

impl From<redb::DatabaseError> for StoreError {
    fn from(e: redb::DatabaseError) -> Self {
        StoreError::Redb(e.to_string())
    }
}
