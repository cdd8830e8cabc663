//! JSON-RPC 2.0 envelope types shared by the inbound client-facing API and
//! the peer-to-peer calls the Dispatcher/Updater make to Darknodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A JSON-RPC id: either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(i64),
    String(String),
}

impl fmt::Display for RpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcId::Number(n) => write!(f, "{n}"),
            RpcId::String(s) => write!(f, "{s}"),
        }
    }
}

/// `{ "jsonrpc":"2.0", "id":<int|string>, "method":<string>, "params":<json> }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: RpcId,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub const VERSION: &'static str = "2.0";

    pub fn new(id: RpcId, method: impl Into<String>, params: Value) -> Self {
        Self { jsonrpc: Self::VERSION.to_string(), id, method: method.into(), params }
    }
}

/// Standard + lightnode-specific JSON-RPC error codes.
///
/// The first four reuse the JSON-RPC 2.0 reserved range; the rest are
/// lightnode-specific and live outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcErrorCode {
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    Timeout,
    QuorumNotReached,
    ResultUnavailable,
}

impl RpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            RpcErrorCode::InvalidRequest => -32600,
            RpcErrorCode::MethodNotFound => -32601,
            RpcErrorCode::InvalidParams => -32602,
            RpcErrorCode::InternalError => -32603,
            RpcErrorCode::Timeout => -32000,
            RpcErrorCode::QuorumNotReached => -32001,
            RpcErrorCode::ResultUnavailable => -32002,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcErrorObject {
    pub fn new(code: RpcErrorCode, message: impl Into<String>) -> Self {
        Self { code: code.code(), message: message.into(), data: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: RpcId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    pub fn ok(id: RpcId, result: Value) -> Self {
        Self { jsonrpc: RpcRequest::VERSION.to_string(), id, result: Some(result), error: None }
    }

    pub fn err(id: RpcId, error: RpcErrorObject) -> Self {
        Self { jsonrpc: RpcRequest::VERSION.to_string(), id, result: None, error: Some(error) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips_through_json() {
        let req = RpcRequest::new(RpcId::Number(1), "submitTx", serde_json::json!({"a": 1}));
        let text = serde_json::to_string(&req).unwrap();
        let back: RpcRequest = serde_json::from_str(&text).unwrap();
        assert_eq!(back.method, "submitTx");
        assert_eq!(back.jsonrpc, "2.0");
    }

    #[test]
    fn error_codes_match_json_rpc_reserved_range() {
        assert_eq!(RpcErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(RpcErrorCode::InvalidParams.code(), -32602);
        assert_eq!(RpcErrorCode::InternalError.code(), -32603);
    }
}
