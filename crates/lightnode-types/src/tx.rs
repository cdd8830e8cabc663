//! Transaction identity, selector, input variants, and status state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte transaction identity.
///
/// This is the primary key of the Transaction Store and never changes once a
/// [`Tx`] is inserted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", hex::encode(self.0))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// The direction of a cross-chain transaction.
///
/// Drives which [`crate::tx::TxInput`] variant is expected and which Chain
/// Oracle capability the Confirmer consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxKind {
    /// User locks funds on the source chain.
    Lock,
    /// User destroys wrapped funds on the mint chain, no further mint.
    Burn,
    /// User destroys wrapped funds on the mint chain; funds mint on a third chain.
    BurnAndMint,
}

/// Whether the source chain for a `Lock` is UTXO-based or account-based.
///
/// Only meaningful when `kind == TxKind::Lock`; selects between
/// `UTXOLockInfo` and `AccountLockInfo` on the Chain Oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceChainModel {
    Utxo,
    Account,
}

/// Identifies (source chain, destination chain, asset, direction) of a
/// cross-chain tx; drives all branching in the Confirmer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    pub source_chain: String,
    pub dest_chain: String,
    pub asset: String,
    pub kind: TxKind,
    pub source_model: SourceChainModel,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/to{}", self.asset, self.dest_chain)
    }
}

/// Selector-dispatched input variants, replacing a dynamic `input.get("txid")`
/// param bag with one concrete struct per selector kind.
///
/// Deserialization of an inbound `submitTx` chooses the variant from the
/// request's `Selector`; see `lightnode-rpc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TxInput {
    /// UTXO lock: the user locked funds in a specific transaction output.
    UtxoLock {
        txid: Vec<u8>,
        txindex: u32,
        nonce: [u8; 32],
        payload: Vec<u8>,
        recipient: String,
    },
    /// Account-model lock.
    AccountLock { txid: Vec<u8>, nonce: [u8; 32], payload: Vec<u8>, recipient: String },
    /// Burn-only (no further mint on another chain).
    Burn { txid: Vec<u8>, nonce: [u8; 32], amount: u128, recipient: String },
    /// Burn-and-mint: burn funds, mint on `target_chain`.
    BurnToChain { txid: Vec<u8>, nonce: [u8; 32], amount: u128, recipient: String, target_chain: String },
}

impl TxInput {
    /// The nonce is present on every variant and used as the oracle query key.
    pub fn nonce(&self) -> &[u8; 32] {
        match self {
            TxInput::UtxoLock { nonce, .. }
            | TxInput::AccountLock { nonce, .. }
            | TxInput::Burn { nonce, .. }
            | TxInput::BurnToChain { nonce, .. } => nonce,
        }
    }

    pub fn txid(&self) -> &[u8] {
        match self {
            TxInput::UtxoLock { txid, .. }
            | TxInput::AccountLock { txid, .. }
            | TxInput::Burn { txid, .. }
            | TxInput::BurnToChain { txid, .. } => txid,
        }
    }
}

/// Lifecycle status of a [`Tx`] as tracked by the Transaction Store.
///
/// Invariant: status never regresses. The only orders allowed are
/// `pending -> confirming -> confirmed -> done`, or `-> expired` from any
/// non-terminal state via `Prune`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum TxStatus {
    Pending = 0,
    Confirming = 1,
    Confirmed = 2,
    Done = 3,
    Expired = 4,
}

impl TxStatus {
    /// A status is terminal if no further `UpdateStatus` call should move it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Done | TxStatus::Expired)
    }

    /// Whether advancing `self -> next` respects the monotonic ordering.
    ///
    /// `Expired` is reachable from any non-terminal state (via `Prune`); the
    /// three non-expiry statuses only ever move forward.
    pub fn can_advance_to(&self, next: TxStatus) -> bool {
        if *self == next {
            return true;
        }
        match next {
            TxStatus::Expired => !self.is_terminal(),
            _ => !self.is_terminal() && (next as u8) > (*self as u8),
        }
    }
}

/// A pending or settled cross-chain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    pub hash: TxHash,
    pub selector: Selector,
    pub input: TxInput,
    pub status: TxStatus,
    /// Unix timestamp (seconds) the tx was first inserted.
    pub first_seen: u64,
}

impl Tx {
    pub fn new(hash: TxHash, selector: Selector, input: TxInput, first_seen: u64) -> Self {
        Self { hash, selector, input, status: TxStatus::Pending, first_seen }
    }

    /// Non-terminal: still eligible for confirmation polling.
    pub fn is_pending(&self) -> bool {
        matches!(self.status, TxStatus::Pending | TxStatus::Confirming)
    }
}
