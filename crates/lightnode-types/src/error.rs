//! Shared error classification.
//!
//! Every subsystem's own `thiserror` enum implements `fn kind(&self) ->
//! ErrorKind` so the RPC frontend can map any error, regardless of which
//! crate raised it, to the right JSON-RPC error code without downcasting.

use serde::{Deserialize, Serialize};

/// The error kinds named in the error handling design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Transaction Store I/O failure.
    Store,
    /// Chain Oracle reported the tx has not yet reached confirmation depth.
    ChainInsufficientConfirmations,
    /// Chain Oracle reported the source output has already been spent.
    ChainAlreadySpent,
    /// Chain Oracle reported some other, opaque failure.
    ChainOther,
    /// Dispatcher could not resolve a peer identity to an address.
    PeerUnreachable,
    /// Dispatcher's bounded queue was full.
    QueueFull,
    /// "send-message"-like aggregation never reached quorum.
    QuorumNotReached,
    /// "receive-message"-like aggregation got no usable response.
    ResultUnavailable,
    /// A caller-supplied deadline elapsed before completion.
    DeadlineExceeded,
    /// Inbound JSON-RPC request failed envelope validation.
    InvalidRequest,
}

impl ErrorKind {
    /// Whether this error should be retried by its caller on the next tick,
    /// as opposed to being surfaced straight to an external JSON-RPC caller.
    pub fn is_retryable_by_confirmer(&self) -> bool {
        matches!(
            self,
            ErrorKind::Store | ErrorKind::ChainInsufficientConfirmations | ErrorKind::ChainOther | ErrorKind::QueueFull
        )
    }
}
