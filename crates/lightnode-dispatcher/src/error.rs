//! Dispatcher error type.

use lightnode_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DispatchError {
    #[error("no peer in the request resolved to a known address")]
    PeerUnreachable,
    #[error("dispatcher queue is full")]
    QueueFull,
    /// "send-message"-like: all responses arrived but no id reached quorum.
    /// Carries the last non-nil peer response text, if any, so a caller can
    /// apply the legacy "status=done" compatibility check.
    #[error("quorum not reached")]
    QuorumNotReached(Option<String>),
    /// "receive-message"-like: every peer returned nil.
    #[error("no peer returned a usable result")]
    ResultUnavailable(Option<String>),
    #[error("aggregation deadline elapsed")]
    DeadlineExceeded,
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::PeerUnreachable => ErrorKind::PeerUnreachable,
            DispatchError::QueueFull => ErrorKind::QueueFull,
            DispatchError::QuorumNotReached(_) => ErrorKind::QuorumNotReached,
            DispatchError::ResultUnavailable(_) => ErrorKind::ResultUnavailable,
            DispatchError::DeadlineExceeded => ErrorKind::DeadlineExceeded,
        }
    }

    /// The last non-nil peer response text observed before this error was
    /// raised, if any.
    pub fn last_response_text(&self) -> Option<&str> {
        match self {
            DispatchError::QuorumNotReached(text) | DispatchError::ResultUnavailable(text) => {
                text.as_deref()
            }
            _ => None,
        }
    }
}
