//! Chain Oracle error type.

use lightnode_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("chain adapter request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chain adapter response was not valid JSON-RPC: {0}")]
    InvalidResponse(String),
    #[error("chain adapter call exceeded its deadline")]
    DeadlineExceeded,
    /// Opaque failure reported by the chain adapter itself, carried verbatim
    /// so the legacy substring shim (`classify_legacy_message`) can inspect it.
    #[error("chain adapter error: {0}")]
    Other(String),
}

impl OracleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OracleError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            _ => ErrorKind::ChainOther,
        }
    }
}
