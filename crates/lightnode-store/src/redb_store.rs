//! redb-backed Transaction Store.
//!
//! One row per Tx keyed by its 32-byte hash, plus two secondary-index tables
//! so `pending_txs`/`prune` don't have to scan the whole table.

use crate::{error::StoreError, traits::TxStore};
use lightnode_types::{Tx, TxHash, TxStatus};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;

const TXS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("txs");
/// `status ++ first_seen(be) ++ hash -> ()`, maintained only while status is
/// pending or confirming; drives `pending_txs`.
const PENDING_INDEX: TableDefinition<&[u8], &[u8]> = TableDefinition::new("txs_pending_index");
/// `first_seen(be) ++ hash -> ()`, maintained for every row; drives `prune`.
const AGE_INDEX: TableDefinition<&[u8], &[u8]> = TableDefinition::new("txs_age_index");

pub struct RedbTxStore {
    db: Database,
}

impl RedbTxStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TXS)?;
            let _ = write_txn.open_table(PENDING_INDEX)?;
            let _ = write_txn.open_table(AGE_INDEX)?;
        }
        write_txn.commit()?;
        Ok(Self { db })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        // redb has no first-class in-memory backend pre-2.2; `lightnode-store`'s
        // in-memory path is `MemTxStore` instead. This constructor is kept for
        // the rare test that wants the real redb code path without a file.
        let dir = tempfile::tempdir().expect("tempdir for in-memory redb store");
        let path = dir.path().join("lightnode.redb");
        std::mem::forget(dir); // keep the tempdir alive for process lifetime in tests
        Self::open(path)
    }
}

fn pending_key(status: TxStatus, first_seen: u64, hash: &TxHash) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 8 + 32);
    key.push(status as u8);
    key.extend_from_slice(&first_seen.to_be_bytes());
    key.extend_from_slice(hash.as_bytes());
    key
}

fn age_key(first_seen: u64, hash: &TxHash) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + 32);
    key.extend_from_slice(&first_seen.to_be_bytes());
    key.extend_from_slice(hash.as_bytes());
    key
}

impl TxStore for RedbTxStore {
    fn insert(&self, tx: Tx) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut txs = write_txn.open_table(TXS)?;
            if txs.get(tx.hash.as_bytes().as_slice())?.is_some() {
                // Insert is idempotent on tx.hash.
                return Ok(());
            }
            let bytes = serde_json::to_vec(&tx)?;
            txs.insert(tx.hash.as_bytes().as_slice(), bytes.as_slice())?;

            let mut pending = write_txn.open_table(PENDING_INDEX)?;
            if tx.is_pending() {
                let key = pending_key(tx.status, tx.first_seen, &tx.hash);
                pending.insert(key.as_slice(), [].as_slice())?;
            }

            let mut age = write_txn.open_table(AGE_INDEX)?;
            let key = age_key(tx.first_seen, &tx.hash);
            age.insert(key.as_slice(), [].as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn pending_txs(&self, max_age_secs: u64, now: u64) -> Result<Vec<Tx>, StoreError> {
        if max_age_secs == 0 {
            return Ok(Vec::new());
        }
        let read_txn = self.db.begin_read()?;
        let pending = read_txn.open_table(PENDING_INDEX)?;
        let txs = read_txn.open_table(TXS)?;

        let mut out = Vec::new();
        for entry in pending.range::<&[u8]>(..)? {
            let (key, _) = entry?;
            let key = key.value();
            // key layout: [status:1][first_seen:8][hash:32]
            let first_seen = u64::from_be_bytes(key[1..9].try_into().expect("8-byte first_seen"));
            if now.saturating_sub(first_seen) > max_age_secs {
                continue;
            }
            let hash_bytes = &key[9..41];
            if let Some(value) = txs.get(hash_bytes)? {
                let tx: Tx = serde_json::from_slice(value.value())?;
                out.push(tx);
            }
        }
        Ok(out)
    }

    fn update_status(&self, hash: &TxHash, status: TxStatus) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut txs = write_txn.open_table(TXS)?;
            let Some(existing) = txs.get(hash.as_bytes().as_slice())? else {
                tracing::warn!(target: "lightnode_store", %hash, "update_status on unknown tx, ignoring");
                return Ok(());
            };
            let mut tx: Tx = serde_json::from_slice(existing.value())?;
            drop(existing);

            if !tx.status.can_advance_to(status) {
                return Err(StoreError::NonMonotonicStatus(hash.to_string(), tx.status, status));
            }
            let old_status = tx.status;
            tx.status = status;
            let bytes = serde_json::to_vec(&tx)?;
            txs.insert(hash.as_bytes().as_slice(), bytes.as_slice())?;

            let mut pending = write_txn.open_table(PENDING_INDEX)?;
            if old_status != status {
                let old_key = pending_key(old_status, tx.first_seen, hash);
                pending.remove(old_key.as_slice())?;
                if tx.is_pending() {
                    let new_key = pending_key(status, tx.first_seen, hash);
                    pending.insert(new_key.as_slice(), [].as_slice())?;
                }
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn prune(&self, expiry_secs: u64, now: u64) -> Result<usize, StoreError> {
        let cutoff = now.saturating_sub(expiry_secs);
        let mut removed = 0usize;
        let write_txn = self.db.begin_write()?;
        {
            let mut age = write_txn.open_table(AGE_INDEX)?;
            let mut txs = write_txn.open_table(TXS)?;
            let mut pending = write_txn.open_table(PENDING_INDEX)?;

            let stale_keys: Vec<Vec<u8>> = {
                let mut keys = Vec::new();
                for entry in age.range::<&[u8]>(..)? {
                    let (key, _) = entry?;
                    let key = key.value();
                    let first_seen =
                        u64::from_be_bytes(key[0..8].try_into().expect("8-byte first_seen"));
                    if first_seen >= cutoff {
                        break; // age index keys are sorted by first_seen ascending
                    }
                    keys.push(key.to_vec());
                }
                keys
            };

            for key in stale_keys {
                let hash_bytes = &key[8..40];
                if let Some(value) = txs.get(hash_bytes)? {
                    let tx: Tx = serde_json::from_slice(value.value())?;
                    drop(value);
                    if tx.is_pending() {
                        let pending_key = pending_key(tx.status, tx.first_seen, &tx.hash);
                        pending.remove(pending_key.as_slice())?;
                    }
                    txs.remove(hash_bytes)?;
                    age.remove(key.as_slice())?;
                    removed += 1;
                }
            }
        }
        write_txn.commit()?;
        Ok(removed)
    }

    fn get(&self, hash: &TxHash) -> Result<Option<Tx>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let txs = read_txn.open_table(TXS)?;
        match txs.get(hash.as_bytes().as_slice())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn len(&self) -> Result<usize, StoreError> {
        let read_txn = self.db.begin_read()?;
        let txs = read_txn.open_table(TXS)?;
        Ok(txs.len()? as usize)
    }
}
