//! Per-request aggregator: reads every peer's response (or timeout) and
//! resolves the caller's one-shot sink exactly once.

use crate::{error::DispatchError, quorum, types::AggregationPolicy};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

pub(crate) async fn run(
    policy: AggregationPolicy,
    n_dispatched: usize,
    mut result_rx: mpsc::Receiver<Option<serde_json::Value>>,
    deadline: Duration,
    reply: oneshot::Sender<Result<serde_json::Value, DispatchError>>,
) {
    let outcome = tokio::time::timeout(deadline, collect(policy, n_dispatched, &mut result_rx))
        .await
        .unwrap_or(Err(DispatchError::DeadlineExceeded));
    // Exactly one write to the caller's sink, on every path.
    let _ = reply.send(outcome);
}

async fn collect(
    policy: AggregationPolicy,
    n_dispatched: usize,
    result_rx: &mut mpsc::Receiver<Option<serde_json::Value>>,
) -> Result<serde_json::Value, DispatchError> {
    if n_dispatched == 0 {
        return Err(match policy {
            AggregationPolicy::SendMessage => DispatchError::QuorumNotReached(None),
            AggregationPolicy::ReceiveMessage => DispatchError::ResultUnavailable(None),
        });
    }

    match policy {
        AggregationPolicy::ReceiveMessage => {
            let mut last_text = None;
            for _ in 0..n_dispatched {
                match result_rx.recv().await {
                    Some(Some(value)) => {
                        last_text = response_text(&value);
                        return Ok(value);
                    }
                    Some(None) => continue,
                    None => break,
                }
            }
            Err(DispatchError::ResultUnavailable(last_text))
        }
        AggregationPolicy::SendMessage => {
            let threshold = quorum::threshold(n_dispatched);
            let mut tally: HashMap<String, (usize, serde_json::Value)> = HashMap::new();
            let mut last_text = None;
            for _ in 0..n_dispatched {
                let Some(Some(value)) = result_rx.recv().await else { continue };
                last_text = response_text(&value).or(last_text);
                let Some(id) = message_id(&value) else { continue };
                let entry = tally.entry(id).or_insert((0, value));
                entry.0 += 1;
                if entry.0 >= threshold {
                    return Ok(entry.1.clone());
                }
            }
            Err(DispatchError::QuorumNotReached(last_text))
        }
    }
}

fn message_id(value: &serde_json::Value) -> Option<String> {
    value.get("messageID").and_then(|v| v.as_str()).map(str::to_string)
}

/// The free-form text a caller inspects for the legacy "status=done"
/// compatibility check: either an explicit error message, or a fallback to
/// the whole response body.
fn response_text(value: &serde_json::Value) -> Option<String> {
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .or_else(|| Some(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn send_message_resolves_on_quorum() {
        let (tx, rx) = mpsc::channel(8);
        let (reply_tx, reply_rx) = oneshot::channel();
        tokio::spawn(run(AggregationPolicy::SendMessage, 8, rx, Duration::from_secs(1), reply_tx));
        for _ in 0..6 {
            tx.send(Some(json!({"messageID": "M", "ok": true}))).await.unwrap();
        }
        for _ in 0..2 {
            tx.send(None).await.unwrap();
        }
        let result = reply_rx.await.unwrap().unwrap();
        assert_eq!(result["messageID"], "M");
    }

    #[tokio::test]
    async fn send_message_fails_without_quorum() {
        let (tx, rx) = mpsc::channel(4);
        let (reply_tx, reply_rx) = oneshot::channel();
        tokio::spawn(run(AggregationPolicy::SendMessage, 4, rx, Duration::from_millis(200), reply_tx));
        for i in 0..4 {
            tx.send(Some(json!({"messageID": format!("M{i}")}))).await.unwrap();
        }
        assert!(reply_rx.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn quorum_not_reached_carries_last_response_text() {
        let (tx, rx) = mpsc::channel(2);
        let (reply_tx, reply_rx) = oneshot::channel();
        tokio::spawn(run(AggregationPolicy::SendMessage, 2, rx, Duration::from_millis(200), reply_tx));
        tx.send(Some(json!({"error": {"message": "tx rejected: status=done"}}))).await.unwrap();
        let err = reply_rx.await.unwrap().unwrap_err();
        assert_eq!(err.last_response_text(), Some("tx rejected: status=done"));
    }

    #[tokio::test]
    async fn receive_message_returns_first_non_nil() {
        let (tx, rx) = mpsc::channel(2);
        let (reply_tx, reply_rx) = oneshot::channel();
        tokio::spawn(run(AggregationPolicy::ReceiveMessage, 2, rx, Duration::from_secs(1), reply_tx));
        tx.send(None).await.unwrap();
        tx.send(Some(json!({"state": "ready"}))).await.unwrap();
        let result = reply_rx.await.unwrap().unwrap();
        assert_eq!(result["state"], "ready");
    }

    #[tokio::test]
    async fn zero_peers_fails_immediately() {
        let (_tx, rx) = mpsc::channel(1);
        let (reply_tx, reply_rx) = oneshot::channel();
        tokio::spawn(run(AggregationPolicy::ReceiveMessage, 0, rx, Duration::from_secs(5), reply_tx));
        let result = reply_rx.await.unwrap();
        assert!(matches!(result, Err(DispatchError::ResultUnavailable(None))));
    }
}
