//! Updater error type.

use lightnode_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdaterError {
    #[error("peer {0} is unreachable")]
    PeerUnreachable(String),
}

impl UpdaterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpdaterError::PeerUnreachable(_) => ErrorKind::PeerUnreachable,
        }
    }
}
