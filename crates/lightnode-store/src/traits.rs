//! Store contracts, implemented by both the in-memory and the redb-backed
//! backends behind the same trait.

use crate::error::StoreError;
use lightnode_types::{entropy::EntropySource, Peer, PeerId, Tx, TxHash, TxStatus};

/// Durable table of pending/confirmed/expired transactions, keyed by hash.
pub trait TxStore: Send + Sync {
    /// Idempotent on `tx.hash`; a no-op if already present.
    fn insert(&self, tx: Tx) -> Result<(), StoreError>;

    /// All Txs with status in {pending, confirming} and `first_seen` within
    /// `max_age_secs` of `now`.
    fn pending_txs(&self, max_age_secs: u64, now: u64) -> Result<Vec<Tx>, StoreError>;

    /// Advance `hash`'s status. Violating the monotonic ordering is a
    /// programming error and returns `StoreError::NonMonotonicStatus`.
    fn update_status(&self, hash: &TxHash, status: TxStatus) -> Result<(), StoreError>;

    /// Delete every Tx older than `expiry_secs` relative to `now`.
    /// Returns the number of rows removed.
    fn prune(&self, expiry_secs: u64, now: u64) -> Result<usize, StoreError>;

    fn get(&self, hash: &TxHash) -> Result<Option<Tx>, StoreError>;

    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// In-memory (+ optionally durable) mapping from peer identity to address.
pub trait PeerStoreTrait: Send + Sync {
    fn insert(&self, peer: Peer);

    /// No-op for bootstrap peers: they are exempt from deletion by normal
    /// churn.
    fn delete(&self, id: &PeerId);

    fn get(&self, id: &PeerId) -> Option<Peer>;

    fn size(&self) -> usize;

    fn addrs_all(&self) -> Vec<Peer>;

    /// Draw up to `n` peers uniformly without replacement. Returns all peers
    /// if `n > size()`.
    fn random_addrs(&self, n: usize, entropy: &dyn EntropySource) -> Vec<Peer>;

    /// Same as `random_addrs` but restricted to the bootstrap subset.
    fn random_bootstrap_addrs(&self, n: usize, entropy: &dyn EntropySource) -> Vec<Peer>;

    fn is_bootstrap(&self, id: &PeerId) -> bool;
}
