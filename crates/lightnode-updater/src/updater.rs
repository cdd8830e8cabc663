//! Updater: periodic peer-set refresh by sampling, fan-out, and probing.

use crate::{config::UpdaterConfig, error::UpdaterError};
use futures::future::{join_all, select_ok};
use lightnode_store::PeerStoreTrait;
use lightnode_types::{entropy::EntropySource, shutdown::ShutdownRecv, Peer, PeerAddr, PeerId};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct QueryPeersResponse {
    peers: Vec<PeerEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct PeerEntry {
    id: String,
    host: String,
    port: u16,
}

pub struct Updater {
    peer_store: Arc<dyn PeerStoreTrait>,
    entropy: Arc<dyn EntropySource>,
    client: reqwest::Client,
    config: UpdaterConfig,
}

impl Updater {
    pub fn new(peer_store: Arc<dyn PeerStoreTrait>, entropy: Arc<dyn EntropySource>, config: UpdaterConfig) -> Self {
        Self { peer_store, entropy, client: reqwest::Client::new(), config }
    }

    pub async fn run(self: Arc<Self>, mut shutdown: ShutdownRecv) {
        let mut ticker = tokio::time::interval(self.config.poll_rate);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                _ = shutdown.recv() => return,
            }
        }
    }

    pub async fn tick(&self) {
        let mut sampled = self.peer_store.random_addrs(self.config.sample_size, self.entropy.as_ref());
        let bootstrap_sampled =
            self.peer_store.random_bootstrap_addrs(self.config.bootstrap_sample_size, self.entropy.as_ref());
        let mut seen: HashSet<PeerId> = sampled.iter().map(|p| p.id.clone()).collect();
        for peer in bootstrap_sampled {
            if seen.insert(peer.id.clone()) {
                sampled.push(peer);
            }
        }
        if sampled.is_empty() {
            return;
        }

        let deadline = tokio::time::Instant::now() + self.config.timeout;
        let fanout = join_all(sampled.iter().map(|peer| self.query_peer(peer.clone())));
        let responses = match tokio::time::timeout_at(deadline, fanout).await {
            Ok(responses) => responses,
            Err(_) => {
                tracing::warn!("updater tick deadline elapsed before every queryPeers call returned");
                return;
            }
        };

        let mut by_identity: HashMap<PeerId, Vec<PeerAddr>> = HashMap::new();
        for (peer, result) in sampled.iter().zip(responses) {
            match result {
                Some(entries) => {
                    for entry in entries {
                        by_identity
                            .entry(PeerId(entry.id))
                            .or_default()
                            .push(PeerAddr::new(entry.host, entry.port));
                    }
                }
                None => {
                    let err = UpdaterError::PeerUnreachable(peer.id.to_string());
                    tracing::warn!(peer = %peer.id, error = %err, "marking unreachable peer for deletion");
                    self.peer_store.delete(&peer.id);
                }
            }
        }

        let mut inserted = 0usize;
        for (id, mut addrs) in by_identity {
            let mut seen = HashSet::new();
            addrs.retain(|a| seen.insert((a.host.clone(), a.grpc_port)));

            let winner = match addrs.len() {
                0 => continue,
                1 => addrs.into_iter().next(),
                _ => self.resolve_split_identity(&id, addrs).await,
            };
            if let Some(addr) = winner {
                self.peer_store.insert(Peer::new(id, addr));
                inserted += 1;
            }
        }

        tracing::info!(inserted, size = self.peer_store.size(), "updater tick complete");
    }

    async fn query_peer(&self, peer: Peer) -> Option<Vec<PeerEntry>> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.entropy.next_u64(),
            "method": "queryPeers",
            "params": {},
        });
        let resp = self.client.post(peer.addr.json_rpc_url()).json(&body).send().await.ok()?;
        let parsed: QueryPeersResponse = resp.json().await.ok()?;
        Some(parsed.peers)
    }

    /// Multiple distinct addresses claim the same identity: probe each with
    /// `queryStats` in parallel and accept the first to answer within
    /// `probe_timeout`. Dropping the unresolved futures in `select_ok`'s
    /// leftover list is what cancels the losing probes.
    async fn resolve_split_identity(&self, id: &PeerId, addrs: Vec<PeerAddr>) -> Option<PeerAddr> {
        let probes = addrs.into_iter().map(|addr| {
            let client = self.client.clone();
            let probe_timeout = self.config.probe_timeout;
            let request_id = self.entropy.next_u64();
            Box::pin(async move {
                let body = serde_json::json!({
                    "jsonrpc": "2.0",
                    "id": request_id,
                    "method": "queryStats",
                    "params": {},
                });
                let call = client.post(addr.json_rpc_url()).json(&body).send();
                match tokio::time::timeout(probe_timeout, call).await {
                    Ok(Ok(resp)) if resp.status().is_success() => Ok(addr),
                    _ => Err(()),
                }
            })
        });

        match select_ok(probes).await {
            Ok((addr, _losers)) => Some(addr),
            Err(()) => {
                tracing::warn!(identity = %id, "no candidate address answered queryStats in time");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightnode_store::PeerStore;
    use lightnode_types::entropy::DeterministicEntropy;

    fn updater_over(store: Arc<PeerStore>) -> Updater {
        Updater::new(store, Arc::new(DeterministicEntropy::new(1)), UpdaterConfig::default())
    }

    #[tokio::test]
    async fn tick_is_a_noop_with_an_empty_peer_store() {
        let store = Arc::new(PeerStore::new(vec![]));
        let updater = updater_over(store.clone());
        updater.tick().await;
        assert_eq!(store.size(), 0);
    }

    #[tokio::test]
    async fn tick_samples_bootstrap_peers_even_when_excluded_from_the_main_draw() {
        let boot = Peer::new(PeerId("boot-1".into()), PeerAddr::new("127.0.0.1", 1));
        let store = Arc::new(PeerStore::new(vec![boot]));
        let updater = Updater::new(
            store.clone(),
            Arc::new(DeterministicEntropy::new(1)),
            UpdaterConfig { sample_size: 0, bootstrap_sample_size: 1, ..UpdaterConfig::default() },
        );

        // sample_size 0 excludes the bootstrap peer from the main draw, but
        // bootstrap_sample_size still samples it, so it's still the one
        // queried (and, since it never answers, marked for deletion attempt
        // which bootstrap peers are exempt from).
        updater.tick().await;

        assert_eq!(store.size(), 1);
        assert!(store.is_bootstrap(&PeerId("boot-1".into())));
    }

    #[tokio::test]
    async fn unreachable_sampled_peer_is_marked_for_deletion() {
        let boot = Peer::new(PeerId("boot-1".into()), PeerAddr::new("127.0.0.1", 1));
        let dyn_peer = Peer::new(PeerId("dyn-1".into()), PeerAddr::new("127.0.0.1", 65000));
        let store = Arc::new(PeerStore::new(vec![boot]));
        store.insert(dyn_peer);
        let updater = updater_over(store.clone());

        updater.tick().await;

        assert!(store.get(&PeerId("dyn-1".into())).is_none());
        assert_eq!(store.size(), 1);
    }
}
