//! Core data types shared by every lightnode subsystem.
//!
//! Nothing in this crate talks to the network or to disk; it exists so the
//! store, oracle, dispatcher, confirmer, updater, and rpc crates all agree on
//! one vocabulary for transactions, peers, errors, time, and randomness.

pub mod clock;
pub mod entropy;
pub mod error;
pub mod jsonrpc;
pub mod peer;
pub mod shutdown;
pub mod task_manager;
pub mod tx;

pub use clock::{Clock, SystemClock};
pub use entropy::{EntropySource, StdEntropy};
pub use error::ErrorKind;
pub use jsonrpc::{RpcErrorObject, RpcId, RpcRequest, RpcResponse};
pub use peer::{Peer, PeerAddr, PeerId};
pub use shutdown::{Notifier, ShutdownRecv};
pub use task_manager::TaskManager;
pub use tx::{Selector, Tx, TxHash, TxInput, TxKind, TxStatus};
