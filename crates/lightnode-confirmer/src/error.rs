//! Confirmer error type, composed from its two collaborators.

use lightnode_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfirmerError {
    #[error(transparent)]
    Store(#[from] lightnode_store::StoreError),
    #[error(transparent)]
    Oracle(#[from] lightnode_oracle::OracleError),
}

impl ConfirmerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfirmerError::Store(e) => e.kind(),
            ConfirmerError::Oracle(e) => e.kind(),
        }
    }
}
