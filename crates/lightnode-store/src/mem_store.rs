//! In-memory `TxStore`, used by unit tests across the workspace that don't
//! want a redb file on disk.

use crate::{error::StoreError, traits::TxStore};
use dashmap::DashMap;
use lightnode_types::{Tx, TxHash, TxStatus};

#[derive(Default)]
pub struct MemTxStore {
    txs: DashMap<TxHash, Tx>,
}

impl MemTxStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TxStore for MemTxStore {
    fn insert(&self, tx: Tx) -> Result<(), StoreError> {
        self.txs.entry(tx.hash).or_insert(tx);
        Ok(())
    }

    fn pending_txs(&self, max_age_secs: u64, now: u64) -> Result<Vec<Tx>, StoreError> {
        if max_age_secs == 0 {
            return Ok(Vec::new());
        }
        Ok(self
            .txs
            .iter()
            .filter(|e| e.is_pending() && now.saturating_sub(e.first_seen) <= max_age_secs)
            .map(|e| e.value().clone())
            .collect())
    }

    fn update_status(&self, hash: &TxHash, status: TxStatus) -> Result<(), StoreError> {
        let Some(mut entry) = self.txs.get_mut(hash) else {
            tracing::warn!(target: "lightnode_store", %hash, "update_status on unknown tx, ignoring");
            return Ok(());
        };
        if !entry.status.can_advance_to(status) {
            return Err(StoreError::NonMonotonicStatus(hash.to_string(), entry.status, status));
        }
        entry.status = status;
        Ok(())
    }

    fn prune(&self, expiry_secs: u64, now: u64) -> Result<usize, StoreError> {
        let cutoff = now.saturating_sub(expiry_secs);
        let stale: Vec<TxHash> =
            self.txs.iter().filter(|e| e.first_seen < cutoff).map(|e| *e.key()).collect();
        for hash in &stale {
            self.txs.remove(hash);
        }
        Ok(stale.len())
    }

    fn get(&self, hash: &TxHash) -> Result<Option<Tx>, StoreError> {
        Ok(self.txs.get(hash).map(|e| e.value().clone()))
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.txs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightnode_types::{Selector, SourceChainModel, TxInput, TxKind};

    fn sample_tx(hash: u8, first_seen: u64) -> Tx {
        Tx::new(
            TxHash([hash; 32]),
            Selector {
                source_chain: "Bitcoin".into(),
                dest_chain: "Ethereum".into(),
                asset: "BTC".into(),
                kind: TxKind::Lock,
                source_model: SourceChainModel::Utxo,
            },
            TxInput::UtxoLock {
                txid: vec![9],
                txindex: 0,
                nonce: [0u8; 32],
                payload: vec![],
                recipient: "0xabc".into(),
            },
            first_seen,
        )
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let store = MemTxStore::new();
        store.insert(sample_tx(1, 10)).unwrap();
        assert_eq!(store.get(&TxHash([1; 32])).unwrap().unwrap().status, TxStatus::Pending);
    }

    #[test]
    fn insert_is_idempotent_on_hash() {
        let store = MemTxStore::new();
        store.insert(sample_tx(1, 10)).unwrap();
        let mut dup = sample_tx(1, 10);
        dup.status = TxStatus::Done; // would be discarded since the hash already exists
        store.insert(dup).unwrap();
        assert_eq!(store.get(&TxHash([1; 32])).unwrap().unwrap().status, TxStatus::Pending);
    }

    #[test]
    fn update_status_on_unknown_hash_is_a_quiet_noop() {
        let store = MemTxStore::new();
        assert!(store.update_status(&TxHash([7; 32]), TxStatus::Done).is_ok());
    }

    #[test]
    fn pending_txs_excludes_terminal_statuses() {
        let store = MemTxStore::new();
        store.insert(sample_tx(1, 100)).unwrap();
        store.insert(sample_tx(2, 100)).unwrap();
        store.update_status(&TxHash([2; 32]), TxStatus::Done).unwrap();
        let pending = store.pending_txs(1000, 100).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].hash, TxHash([1; 32]));
    }
}
