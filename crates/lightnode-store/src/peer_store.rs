//! Peer Store: an in-memory `DashMap`, with an optional redb-backed `Peers`
//! table so the dynamic peer set survives a restart.

use crate::{error::StoreError, traits::PeerStoreTrait};
use dashmap::DashMap;
use lightnode_types::{entropy::EntropySource, Peer, PeerAddr, PeerId};
use redb::{Database, ReadableTable, TableDefinition};
use std::collections::HashSet;
use std::path::Path;

/// `identity -> "host:grpc_port"`, the persisted layout named in the
/// external interface.
const PEERS: TableDefinition<&str, &str> = TableDefinition::new("peers");

/// The live Darknode peer set.
///
/// Bootstrap peers are recorded at construction from a seed list and are
/// exempt from [`PeerStore::delete`]; the dynamic set is learned from
/// [`crate::PeerStoreTrait::insert`] calls made by the Updater.
pub struct PeerStore {
    peers: DashMap<PeerId, PeerAddr>,
    bootstrap: HashSet<PeerId>,
    db: Option<Database>,
}

impl PeerStore {
    /// Build a store seeded with `bootstrap`, with no backing redb file.
    /// Used by every in-process caller that doesn't need the dynamic set to
    /// survive a restart (tests, and any deployment content with rebuilding
    /// the peer set from bootstrap + Updater churn on every launch).
    pub fn new(bootstrap: Vec<Peer>) -> Self {
        let peers = DashMap::new();
        let mut bootstrap_ids = HashSet::new();
        for peer in bootstrap {
            bootstrap_ids.insert(peer.id.clone());
            peers.insert(peer.id, peer.addr);
        }
        Self { peers, bootstrap: bootstrap_ids, db: None }
    }

    /// Open (or create) a redb-backed store at `path`: loads whatever
    /// dynamic set was persisted from a prior run, then re-applies
    /// `bootstrap` on top so the bootstrap set is never missing even if it
    /// was absent from the file.
    pub fn open(path: impl AsRef<Path>, bootstrap: Vec<Peer>) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PEERS)?;
        }
        write_txn.commit()?;

        let peers = DashMap::new();
        {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(PEERS)?;
            for row in table.iter()? {
                let (id, addr) = row?;
                if let Some(peer_addr) = parse_addr(addr.value()) {
                    peers.insert(PeerId(id.value().to_string()), peer_addr);
                }
            }
        }

        let mut bootstrap_ids = HashSet::new();
        for peer in &bootstrap {
            bootstrap_ids.insert(peer.id.clone());
        }

        let store = Self { peers, bootstrap: bootstrap_ids, db: Some(db) };
        store.reseed_bootstrap(&bootstrap);
        Ok(store)
    }

    /// Re-apply the bootstrap set, persisting each entry if this store has a
    /// backing redb file. Called once from `open` so the bootstrap set is
    /// never missing from a freshly loaded dynamic set.
    fn reseed_bootstrap(&self, bootstrap: &[Peer]) {
        for peer in bootstrap {
            self.peers.insert(peer.id.clone(), peer.addr.clone());
            self.persist(&peer.id, &peer.addr);
        }
    }

    fn persist(&self, id: &PeerId, addr: &PeerAddr) {
        let Some(db) = &self.db else { return };
        if let Err(e) = persist_row(db, id, addr) {
            tracing::error!(peer = %id, error = %e, "failed to persist peer");
        }
    }

    fn remove_persisted(&self, id: &PeerId) {
        let Some(db) = &self.db else { return };
        if let Err(e) = remove_row(db, id) {
            tracing::error!(peer = %id, error = %e, "failed to remove persisted peer");
        }
    }
}

fn persist_row(db: &Database, id: &PeerId, addr: &PeerAddr) -> Result<(), StoreError> {
    let write_txn = db.begin_write()?;
    {
        let mut table = write_txn.open_table(PEERS)?;
        table.insert(id.0.as_str(), format!("{}:{}", addr.host, addr.grpc_port).as_str())?;
    }
    write_txn.commit()?;
    Ok(())
}

fn remove_row(db: &Database, id: &PeerId) -> Result<(), StoreError> {
    let write_txn = db.begin_write()?;
    {
        let mut table = write_txn.open_table(PEERS)?;
        table.remove(id.0.as_str())?;
    }
    write_txn.commit()?;
    Ok(())
}

fn parse_addr(s: &str) -> Option<PeerAddr> {
    let (host, port) = s.rsplit_once(':')?;
    let port: u16 = port.parse().ok()?;
    Some(PeerAddr::new(host, port))
}

impl PeerStoreTrait for PeerStore {
    fn insert(&self, peer: Peer) {
        self.persist(&peer.id, &peer.addr);
        self.peers.insert(peer.id, peer.addr);
    }

    fn delete(&self, id: &PeerId) {
        if self.bootstrap.contains(id) {
            return;
        }
        self.peers.remove(id);
        self.remove_persisted(id);
    }

    fn get(&self, id: &PeerId) -> Option<Peer> {
        self.peers.get(id).map(|entry| Peer::new(id.clone(), entry.value().clone()))
    }

    fn size(&self) -> usize {
        self.peers.len()
    }

    fn addrs_all(&self) -> Vec<Peer> {
        self.peers.iter().map(|e| Peer::new(e.key().clone(), e.value().clone())).collect()
    }

    fn random_addrs(&self, n: usize, entropy: &dyn EntropySource) -> Vec<Peer> {
        let all = self.addrs_all();
        let picked = entropy.sample_indices(all.len(), n);
        picked.into_iter().map(|i| all[i].clone()).collect()
    }

    fn random_bootstrap_addrs(&self, n: usize, entropy: &dyn EntropySource) -> Vec<Peer> {
        let all: Vec<Peer> = self
            .peers
            .iter()
            .filter(|e| self.bootstrap.contains(e.key()))
            .map(|e| Peer::new(e.key().clone(), e.value().clone()))
            .collect();
        let picked = entropy.sample_indices(all.len(), n);
        picked.into_iter().map(|i| all[i].clone()).collect()
    }

    fn is_bootstrap(&self, id: &PeerId) -> bool {
        self.bootstrap.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightnode_types::entropy::DeterministicEntropy;

    fn peer(id: &str, port: u16) -> Peer {
        Peer::new(PeerId(id.to_string()), PeerAddr::new("127.0.0.1", port))
    }

    #[test]
    fn bootstrap_peers_survive_delete() {
        let store = PeerStore::new(vec![peer("boot-1", 1000)]);
        store.delete(&PeerId("boot-1".to_string()));
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn non_bootstrap_peers_are_deletable() {
        let store = PeerStore::new(vec![]);
        store.insert(peer("dyn-1", 2000));
        assert_eq!(store.size(), 1);
        store.delete(&PeerId("dyn-1".to_string()));
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn random_addrs_returns_all_when_n_exceeds_size() {
        let store = PeerStore::new(vec![peer("a", 1), peer("b", 2)]);
        let entropy = DeterministicEntropy::new(42);
        let picked = store.random_addrs(10, &entropy);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn random_addrs_with_zero_size_returns_empty() {
        let store = PeerStore::new(vec![]);
        let entropy = DeterministicEntropy::new(1);
        assert!(store.random_addrs(5, &entropy).is_empty());
    }

    #[test]
    fn peer_store_size_never_drops_below_bootstrap_size() {
        let store = PeerStore::new(vec![peer("boot-1", 1), peer("boot-2", 2)]);
        store.insert(peer("dyn-1", 3));
        store.delete(&PeerId("dyn-1".to_string()));
        store.delete(&PeerId("boot-1".to_string()));
        store.delete(&PeerId("boot-2".to_string()));
        assert!(store.size() >= 2);
    }

    #[test]
    fn random_bootstrap_addrs_only_draws_from_the_bootstrap_set() {
        let store = PeerStore::new(vec![peer("boot-1", 1), peer("boot-2", 2)]);
        store.insert(peer("dyn-1", 3));
        let entropy = DeterministicEntropy::new(7);
        let picked = store.random_bootstrap_addrs(10, &entropy);
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|p| store.is_bootstrap(&p.id)));
    }

    #[test]
    fn open_persists_inserts_and_deletes_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peers.redb");
        let boot = peer("boot-1", 1000);

        {
            let store = PeerStore::open(&path, vec![boot.clone()]).unwrap();
            store.insert(peer("dyn-1", 2000));
            store.insert(peer("dyn-2", 3000));
            store.delete(&PeerId("dyn-1".to_string()));
        }

        let reopened = PeerStore::open(&path, vec![boot]).unwrap();
        assert_eq!(reopened.size(), 2);
        assert!(reopened.get(&PeerId("dyn-1".to_string())).is_none());
        assert_eq!(
            reopened.get(&PeerId("dyn-2".to_string())).unwrap().addr,
            PeerAddr::new("127.0.0.1", 3000)
        );
        assert!(reopened.is_bootstrap(&PeerId("boot-1".to_string())));
    }
}
