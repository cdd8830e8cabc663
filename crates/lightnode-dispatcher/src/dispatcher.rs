//! Dispatcher: bounded worker queue + fixed worker pool + per-request
//! aggregator. See [`crate::types::DispatchRequest`].

use crate::{
    aggregator,
    types::{AggregationPolicy, DispatchRequest, PeerCall},
    worker,
};
use lightnode_store::PeerStoreTrait;
use lightnode_types::{entropy::EntropySource, PeerId};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

pub struct Dispatcher {
    queue_tx: mpsc::Sender<PeerCall>,
    peer_store: Arc<dyn PeerStoreTrait>,
    entropy: Arc<dyn EntropySource>,
}

impl Dispatcher {
    /// Spawns `workers` worker tasks sharing a queue of capacity `cap`.
    pub fn new(
        cap: usize,
        workers: usize,
        peer_store: Arc<dyn PeerStoreTrait>,
        entropy: Arc<dyn EntropySource>,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(cap);
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let client = reqwest::Client::new();
        for _ in 0..workers {
            tokio::spawn(worker::run(client.clone(), queue_rx.clone()));
        }
        Self { queue_tx, peer_store, entropy }
    }

    /// Non-blocking. `true` unless every per-peer call for this request was
    /// dropped because the worker queue had no room.
    pub fn send(&self, req: DispatchRequest) -> bool {
        let resolved: Vec<(PeerId, String)> = req
            .peers
            .iter()
            .filter_map(|id| match self.peer_store.get(id) {
                Some(peer) => Some((id.clone(), peer.addr.json_rpc_url())),
                None => {
                    tracing::warn!(peer = %id, "dispatcher could not resolve peer to an address");
                    None
                }
            })
            .collect();

        if resolved.is_empty() {
            let _ = req.reply.send(Err(crate::error::DispatchError::PeerUnreachable));
            return true;
        }

        let (result_tx, result_rx) = mpsc::channel(resolved.len());

        let mut dispatched = 0usize;
        for (peer_id, url) in resolved {
            let call = PeerCall {
                peer_id: peer_id.clone(),
                url,
                method: req.method.clone(),
                params: req.params.clone(),
                request_id: self.entropy.next_u64(),
                deadline: req.timeout,
                result_tx: result_tx.clone(),
            };
            match self.queue_tx.try_send(call) {
                Ok(()) => dispatched += 1,
                Err(_) => {
                    tracing::warn!(peer = %peer_id, "dispatcher queue full, dropping this peer's call");
                }
            }
        }
        drop(result_tx);

        tokio::spawn(aggregator::run(req.policy, dispatched, result_rx, req.timeout, req.reply));

        dispatched > 0
    }

    /// Shorthand for building a `DispatchRequest` with a fresh reply sink and
    /// awaiting the resolved value. Used by callers that don't need to hold
    /// onto the raw oneshot receiver themselves.
    pub async fn call(
        &self,
        method: impl Into<String>,
        params: serde_json::Value,
        peers: Vec<PeerId>,
        timeout: std::time::Duration,
        policy: AggregationPolicy,
    ) -> Result<serde_json::Value, crate::error::DispatchError> {
        let (reply, reply_rx) = tokio::sync::oneshot::channel();
        let req = DispatchRequest { method: method.into(), params, peers, timeout, policy, reply };
        if !self.send(req) {
            return Err(crate::error::DispatchError::QueueFull);
        }
        reply_rx.await.unwrap_or(Err(crate::error::DispatchError::DeadlineExceeded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;
    use lightnode_store::PeerStore;
    use lightnode_types::entropy::DeterministicEntropy;
    use lightnode_types::{Peer, PeerAddr};
    use std::time::Duration;

    fn peer(id: &str, port: u16) -> Peer {
        Peer::new(PeerId(id.to_string()), PeerAddr::new("127.0.0.1", port))
    }

    #[tokio::test]
    async fn unknown_peer_replies_with_peer_unreachable() {
        let peer_store = Arc::new(PeerStore::new(vec![]));
        let entropy = Arc::new(DeterministicEntropy::new(1));
        let dispatcher = Dispatcher::new(8, 1, peer_store, entropy);

        let err = dispatcher
            .call(
                "ping",
                serde_json::json!({}),
                vec![PeerId("ghost".to_string())],
                Duration::from_millis(100),
                AggregationPolicy::ReceiveMessage,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::PeerUnreachable));
    }

    #[tokio::test]
    async fn overflow_calls_are_dropped_but_remaining_still_dispatch() {
        // No workers drain the queue, so with cap 1 and two resolvable peers
        // exactly one call is admitted and one is dropped.
        let peer_store = Arc::new(PeerStore::new(vec![peer("p1", 1000), peer("p2", 1001)]));
        let entropy = Arc::new(DeterministicEntropy::new(1));
        let dispatcher = Dispatcher::new(1, 0, peer_store, entropy);

        let (reply, reply_rx) = tokio::sync::oneshot::channel();
        let req = DispatchRequest {
            method: "ping".to_string(),
            params: serde_json::json!({}),
            peers: vec![PeerId("p1".to_string()), PeerId("p2".to_string())],
            timeout: Duration::from_millis(50),
            policy: AggregationPolicy::ReceiveMessage,
            reply,
        };

        assert!(dispatcher.send(req));
        // Nothing ever drains the queued call, so the aggregator times out.
        let result = reply_rx.await.unwrap();
        assert!(matches!(result, Err(DispatchError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn queue_full_on_every_peer_reports_queue_full() {
        let peer_store = Arc::new(PeerStore::new(vec![peer("p1", 1000)]));
        let entropy = Arc::new(DeterministicEntropy::new(1));
        // Fill the one-slot queue first so the dispatcher's own call has no room.
        let dispatcher = Dispatcher::new(1, 0, peer_store.clone(), entropy.clone());
        let (reply1, _rx1) = tokio::sync::oneshot::channel();
        dispatcher.send(DispatchRequest {
            method: "ping".to_string(),
            params: serde_json::json!({}),
            peers: vec![PeerId("p1".to_string())],
            timeout: Duration::from_millis(50),
            policy: AggregationPolicy::ReceiveMessage,
            reply: reply1,
        });

        let err = dispatcher
            .call(
                "ping",
                serde_json::json!({}),
                vec![PeerId("p1".to_string())],
                Duration::from_millis(50),
                AggregationPolicy::ReceiveMessage,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::QueueFull));
    }
}
