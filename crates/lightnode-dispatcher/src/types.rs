//! Wire and queue types shared by the dispatcher's worker pool and
//! aggregator.

use crate::error::DispatchError;
use lightnode_types::PeerId;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Per-method aggregation policy, chosen by the caller (the Confirmer uses
/// `SendMessage` for promotions, the RPC frontend uses `ReceiveMessage` for
/// reads).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationPolicy {
    /// Count equivalent successful responses by message-id key; first id to
    /// reach quorum wins.
    SendMessage,
    /// First non-nil response wins.
    ReceiveMessage,
}

/// A fan-out request submitted to the Dispatcher.
pub struct DispatchRequest {
    pub method: String,
    pub params: serde_json::Value,
    pub peers: Vec<PeerId>,
    pub timeout: Duration,
    pub policy: AggregationPolicy,
    pub reply: oneshot::Sender<Result<serde_json::Value, DispatchError>>,
}

/// One HTTP call to one peer, queued for a worker.
pub(crate) struct PeerCall {
    pub peer_id: PeerId,
    pub url: String,
    pub method: String,
    pub params: serde_json::Value,
    pub request_id: u64,
    pub deadline: Duration,
    /// `None` means the call failed (timeout, transport error, retries
    /// exhausted); workers always write exactly once.
    pub result_tx: mpsc::Sender<Option<serde_json::Value>>,
}
