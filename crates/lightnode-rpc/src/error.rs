//! Maps every subsystem's [`ErrorKind`] to the JSON-RPC error code returned
//! to the external caller.

use lightnode_types::{jsonrpc::RpcErrorCode, ErrorKind};

pub fn error_code_for(kind: ErrorKind) -> RpcErrorCode {
    match kind {
        ErrorKind::QuorumNotReached => RpcErrorCode::QuorumNotReached,
        ErrorKind::ResultUnavailable => RpcErrorCode::ResultUnavailable,
        ErrorKind::DeadlineExceeded => RpcErrorCode::Timeout,
        ErrorKind::InvalidRequest => RpcErrorCode::InvalidRequest,
        ErrorKind::Store
        | ErrorKind::ChainInsufficientConfirmations
        | ErrorKind::ChainAlreadySpent
        | ErrorKind::ChainOther
        | ErrorKind::PeerUnreachable
        | ErrorKind::QueueFull => RpcErrorCode::InternalError,
    }
}
