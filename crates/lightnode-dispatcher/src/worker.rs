//! Worker pool: pulls one [`PeerCall`] at a time off the bounded queue and
//! executes it with a timeout and constant-backoff retry, never blocking on
//! another worker's in-flight call.

use crate::types::PeerCall;
use backoff::backoff::Backoff;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// Retries at a fixed 5s interval, unbounded; the surrounding
/// `tokio::time::timeout` in [`execute`] is what enforces the call deadline.
struct ConstantBackoff {
    interval: Duration,
}

impl Backoff for ConstantBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        Some(self.interval)
    }

    fn reset(&mut self) {}
}

/// Runs until `queue` is closed. Spawn `N` of these to build the worker pool.
pub(crate) async fn run(client: reqwest::Client, queue: Arc<Mutex<mpsc::Receiver<PeerCall>>>) {
    loop {
        let call = {
            let mut rx = queue.lock().await;
            rx.recv().await
        };
        let Some(call) = call else {
            return;
        };
        let response = execute(&client, &call).await;
        // Workers never block on each other: the result channel has capacity
        // for every peer dispatched, so this send never waits on the
        // aggregator's consumption.
        let _ = call.result_tx.send(response).await;
    }
}

async fn execute(client: &reqwest::Client, call: &PeerCall) -> Option<serde_json::Value> {
    let body = lightnode_types::RpcRequest::new(
        lightnode_types::RpcId::Number(call.request_id as i64),
        call.method.clone(),
        call.params.clone(),
    );

    let op = || {
        let client = client.clone();
        let url = call.url.clone();
        let body = &body;
        async move {
            let resp = client.post(&url).json(body).send().await.map_err(|e| {
                tracing::warn!(peer = %call.peer_id, error = %e, "peer call failed, retrying");
                backoff::Error::transient(e)
            })?;
            let value: serde_json::Value = resp.json().await.map_err(backoff::Error::permanent)?;
            Ok(value)
        }
    };

    let backoff = ConstantBackoff { interval: Duration::from_secs(5) };
    match tokio::time::timeout(call.deadline, backoff::future::retry(backoff, op)).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            tracing::warn!(peer = %call.peer_id, error = %e, "peer call exhausted retries");
            None
        }
        Err(_) => {
            tracing::warn!(peer = %call.peer_id, "peer call deadline elapsed");
            None
        }
    }
}
