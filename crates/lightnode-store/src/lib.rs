//! Transaction Store and Peer Store: the two durable tables a Lightnode
//! keeps locally. Both are exposed as traits so `lightnode-confirmer`,
//! `lightnode-updater`, and `lightnode-rpc` depend on the contract rather
//! than a concrete backend.

pub mod error;
pub mod mem_store;
pub mod peer_store;
pub mod redb_store;
pub mod traits;

pub use error::StoreError;
pub use mem_store::MemTxStore;
pub use peer_store::PeerStore;
pub use redb_store::RedbTxStore;
pub use traits::{PeerStoreTrait, TxStore};
