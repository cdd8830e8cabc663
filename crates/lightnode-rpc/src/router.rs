//! Envelope validation and method routing for inbound JSON-RPC requests.

use crate::error::error_code_for;
use lightnode_dispatcher::{AggregationPolicy, Dispatcher};
use lightnode_store::{PeerStoreTrait, TxStore};
use lightnode_types::{
    clock::Clock,
    jsonrpc::{RpcErrorCode, RpcErrorObject, RpcId, RpcRequest, RpcResponse},
    Selector, Tx, TxHash, TxInput,
};
use serde::Deserialize;
use serde_json::Value;
use std::{sync::Arc, time::Duration};

/// Routes validated requests to the Transaction Store, Peer Store, or
/// Dispatcher. Holds no network listener of its own; see
/// [`crate::server`] for the thin transport wrapping this.
pub struct RpcRouter {
    store: Arc<dyn TxStore>,
    peer_store: Arc<dyn PeerStoreTrait>,
    dispatcher: Arc<Dispatcher>,
    clock: Arc<dyn Clock>,
    forward_timeout: Duration,
}

impl RpcRouter {
    pub fn new(
        store: Arc<dyn TxStore>,
        peer_store: Arc<dyn PeerStoreTrait>,
        dispatcher: Arc<Dispatcher>,
        clock: Arc<dyn Clock>,
        forward_timeout: Duration,
    ) -> Self {
        Self { store, peer_store, dispatcher, clock, forward_timeout }
    }

    /// Never panics: every failure path, including a request that doesn't
    /// even parse as a JSON-RPC envelope, is returned as a populated
    /// `RpcResponse::error`.
    pub async fn handle(&self, raw: Value) -> RpcResponse {
        let fallback_id = raw
            .get("id")
            .and_then(|v| serde_json::from_value::<RpcId>(v.clone()).ok())
            .unwrap_or(RpcId::Number(0));

        let request: RpcRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(e) => {
                return RpcResponse::err(
                    fallback_id,
                    RpcErrorObject::new(RpcErrorCode::InvalidRequest, format!("malformed request: {e}")),
                );
            }
        };

        if let Err(error) = validate_envelope(&request) {
            return RpcResponse::err(request.id, error);
        }

        let result = self.route(&request.method, request.params).await;
        match result {
            Ok(value) => RpcResponse::ok(request.id, value),
            Err(error) => RpcResponse::err(request.id, error),
        }
    }

    async fn route(&self, method: &str, params: Value) -> Result<Value, RpcErrorObject> {
        match method {
            "submitTx" => self.submit_tx(params),
            "queryTx" => self.query_tx(params),
            "queryPeers" => self.query_peers(),
            "queryNumPeers" => self.query_num_peers(),
            "queryStats" => self.forward("queryStats", params).await,
            "queryState" => self.forward("queryState", params).await,
            other => {
                Err(RpcErrorObject::new(RpcErrorCode::MethodNotFound, format!("unrecognized method {other}")))
            }
        }
    }

    fn submit_tx(&self, params: Value) -> Result<Value, RpcErrorObject> {
        let params: SubmitTxParams = serde_json::from_value(params)
            .map_err(|e| RpcErrorObject::new(RpcErrorCode::InvalidParams, format!("invalid submitTx params: {e}")))?;
        let hash = parse_hash(&params.hash)?;
        let tx = Tx::new(hash, params.selector, params.input, self.clock.now_unix());
        self.store
            .insert(tx)
            .map_err(|e| RpcErrorObject::new(error_code_for(e.kind()), e.to_string()))?;
        Ok(serde_json::json!({ "hash": params.hash }))
    }

    fn query_tx(&self, params: Value) -> Result<Value, RpcErrorObject> {
        let params: QueryTxParams = serde_json::from_value(params)
            .map_err(|e| RpcErrorObject::new(RpcErrorCode::InvalidParams, format!("invalid queryTx params: {e}")))?;
        let hash = parse_hash(&params.hash)?;
        let tx = self
            .store
            .get(&hash)
            .map_err(|e| RpcErrorObject::new(error_code_for(e.kind()), e.to_string()))?;
        Ok(serde_json::to_value(tx).expect("Tx serializes to JSON"))
    }

    fn query_peers(&self) -> Result<Value, RpcErrorObject> {
        let peers: Vec<Value> = self
            .peer_store
            .addrs_all()
            .into_iter()
            .map(|p| serde_json::json!({ "id": p.id.0, "host": p.addr.host, "port": p.addr.grpc_port }))
            .collect();
        Ok(serde_json::json!({ "peers": peers }))
    }

    fn query_num_peers(&self) -> Result<Value, RpcErrorObject> {
        Ok(serde_json::json!({ "numPeers": self.peer_store.size() }))
    }

    /// `queryStats`/`queryState` are peer-to-peer methods: an external
    /// caller's request is itself fanned out to the known peer set and
    /// resolved with first-non-nil-wins aggregation.
    async fn forward(&self, method: &str, params: Value) -> Result<Value, RpcErrorObject> {
        let peers = self.peer_store.addrs_all().into_iter().map(|p| p.id).collect();
        self.dispatcher
            .call(method, params, peers, self.forward_timeout, AggregationPolicy::ReceiveMessage)
            .await
            .map_err(|e| RpcErrorObject::new(error_code_for(e.kind()), e.to_string()))
    }
}

fn validate_envelope(request: &RpcRequest) -> Result<(), RpcErrorObject> {
    if request.jsonrpc != RpcRequest::VERSION {
        return Err(RpcErrorObject::new(RpcErrorCode::InvalidRequest, "jsonrpc must be \"2.0\""));
    }
    if request.method.trim().is_empty() {
        return Err(RpcErrorObject::new(RpcErrorCode::InvalidRequest, "method must be non-empty"));
    }
    Ok(())
}

fn parse_hash(hex_str: &str) -> Result<TxHash, RpcErrorObject> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| RpcErrorObject::new(RpcErrorCode::InvalidParams, format!("invalid hash hex: {e}")))?;
    let array: [u8; 32] =
        bytes.try_into().map_err(|_| RpcErrorObject::new(RpcErrorCode::InvalidParams, "hash must be 32 bytes"))?;
    Ok(TxHash(array))
}

#[derive(Debug, Deserialize)]
struct SubmitTxParams {
    hash: String,
    selector: Selector,
    input: TxInput,
}

#[derive(Debug, Deserialize)]
struct QueryTxParams {
    hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightnode_store::{MemTxStore, PeerStore};
    use lightnode_types::{clock::TestClock, entropy::DeterministicEntropy, SourceChainModel, TxKind, TxStatus};

    fn router() -> (Arc<RpcRouter>, Arc<MemTxStore>, Arc<PeerStore>) {
        let store = Arc::new(MemTxStore::new());
        let peer_store = Arc::new(PeerStore::new(vec![]));
        let dispatcher =
            Arc::new(Dispatcher::new(8, 2, peer_store.clone(), Arc::new(DeterministicEntropy::new(1))));
        let clock = Arc::new(TestClock::new(1_000));
        let router = Arc::new(RpcRouter::new(
            store.clone(),
            peer_store.clone(),
            dispatcher,
            clock,
            Duration::from_millis(200),
        ));
        (router, store, peer_store)
    }

    fn envelope(method: &str, params: Value) -> Value {
        serde_json::json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params })
    }

    #[tokio::test]
    async fn rejects_wrong_jsonrpc_version() {
        let (router, ..) = router();
        let mut req = envelope("queryNumPeers", serde_json::json!({}));
        req["jsonrpc"] = serde_json::json!("1.0");
        let resp = router.handle(req).await;
        assert_eq!(resp.error.unwrap().code, RpcErrorCode::InvalidRequest.code());
    }

    #[tokio::test]
    async fn rejects_empty_method() {
        let (router, ..) = router();
        let mut req = envelope("queryNumPeers", serde_json::json!({}));
        req["method"] = serde_json::json!("");
        let resp = router.handle(req).await;
        assert_eq!(resp.error.unwrap().code, RpcErrorCode::InvalidRequest.code());
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let (router, ..) = router();
        let resp = router.handle(envelope("doesNotExist", serde_json::json!({}))).await;
        assert_eq!(resp.error.unwrap().code, RpcErrorCode::MethodNotFound.code());
    }

    #[tokio::test]
    async fn submit_tx_then_query_tx_round_trips() {
        let (router, ..) = router();
        let hash = hex::encode([9u8; 32]);
        let selector = Selector {
            source_chain: "Bitcoin".into(),
            dest_chain: "Ethereum".into(),
            asset: "BTC".into(),
            kind: TxKind::Lock,
            source_model: SourceChainModel::Utxo,
        };
        let input = TxInput::UtxoLock {
            txid: vec![1, 2, 3],
            txindex: 0,
            nonce: [0u8; 32],
            payload: vec![],
            recipient: "0xabc".into(),
        };
        let params = serde_json::json!({ "hash": hash, "selector": selector, "input": input });
        let submit_resp = router.handle(envelope("submitTx", params)).await;
        assert!(submit_resp.error.is_none());

        let query_resp = router.handle(envelope("queryTx", serde_json::json!({ "hash": hash }))).await;
        let tx: Option<Tx> = serde_json::from_value(query_resp.result.unwrap()).unwrap();
        assert_eq!(tx.unwrap().status, TxStatus::Pending);
    }

    #[tokio::test]
    async fn query_tx_for_unknown_hash_returns_null_result() {
        let (router, ..) = router();
        let hash = hex::encode([1u8; 32]);
        let resp = router.handle(envelope("queryTx", serde_json::json!({ "hash": hash }))).await;
        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn query_num_peers_reflects_peer_store_size() {
        use lightnode_types::{Peer, PeerAddr, PeerId};
        let (router, _, peer_store) = router();
        peer_store.insert(Peer::new(PeerId("a".into()), PeerAddr::new("10.0.0.1", 9000)));
        let resp = router.handle(envelope("queryNumPeers", serde_json::json!({}))).await;
        assert_eq!(resp.result.unwrap()["numPeers"], 1);
    }

    #[tokio::test]
    async fn query_peers_reflects_stored_entries() {
        use lightnode_types::{Peer, PeerAddr, PeerId};
        let (router, _, peer_store) = router();
        peer_store.insert(Peer::new(PeerId("a".into()), PeerAddr::new("10.0.0.1", 9000)));
        let resp = router.handle(envelope("queryPeers", serde_json::json!({}))).await;
        let peers = resp.result.unwrap()["peers"].as_array().unwrap().len();
        assert_eq!(peers, 1);
    }

    #[tokio::test]
    async fn forward_with_no_known_peers_is_result_unavailable() {
        let (router, ..) = router();
        let resp = router.handle(envelope("queryStats", serde_json::json!({}))).await;
        assert_eq!(resp.error.unwrap().code, RpcErrorCode::ResultUnavailable.code());
    }

    #[test]
    fn invalid_hash_hex_is_invalid_params() {
        assert!(parse_hash("not-hex").is_err());
    }

    #[test]
    fn wrong_length_hash_is_invalid_params() {
        assert!(parse_hash(&hex::encode([1u8; 16])).is_err());
    }
}
