//! Thin HTTP/WS transport wrapping [`crate::router::RpcRouter`]. All method
//! validation and routing lives in the router; this module only binds a
//! socket and hands every inbound call to it.

use crate::router::RpcRouter;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::RpcModule;
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind RPC listener on {addr}: {source}")]
    Bind { addr: SocketAddr, #[source] source: std::io::Error },
    #[error("failed to register RPC method: {0}")]
    Rpc(String),
}

/// The methods named in the recognized-method table; every inbound call is
/// forwarded to the router verbatim as a single JSON object, letting the
/// router re-run its own envelope/method validation regardless of what the
/// transport already parsed.
const METHODS: &[&str] = &["submitTx", "queryTx", "queryPeers", "queryNumPeers", "queryStats", "queryState"];

pub async fn serve(addr: SocketAddr, router: Arc<RpcRouter>) -> Result<ServerHandle, ServerError> {
    let server = Server::builder().build(addr).await.map_err(|source| ServerError::Bind { addr, source })?;

    let mut module = RpcModule::new(router);
    for &method in METHODS {
        module.register_async_method(method, move |params, router| async move {
            let value: serde_json::Value = params.parse().unwrap_or(serde_json::Value::Null);
            let envelope = serde_json::json!({
                "jsonrpc": "2.0",
                "id": 0,
                "method": method,
                "params": value,
            });
            let response = router.handle(envelope).await;
            if let Some(error) = response.error {
                return Err(ErrorObjectOwned::owned(error.code as i32, error.message, error.data));
            }
            Ok::<_, ErrorObjectOwned>(response.result.unwrap_or(serde_json::Value::Null))
        })
        .map_err(|e| ServerError::Rpc(e.to_string()))?;
    }

    Ok(server.start(module))
}
