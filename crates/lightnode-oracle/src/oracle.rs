//! `ChainOracle`: the capability surface a Lightnode uses to ask a source
//! chain whether a cross-chain transaction has reached confirmation depth.

use crate::{
    error::OracleError,
    outcome::{GenericOutcome, UtxoLockOutcome},
};
use async_trait::async_trait;
use std::time::Duration;

/// A UTXO being watched for confirmation depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outpoint {
    pub txid: Vec<u8>,
    pub txindex: u32,
}

/// Per-call budget, propagated from the Confirmer's polling deadline.
#[derive(Debug, Clone, Copy)]
pub struct OracleContext {
    pub deadline: Duration,
}

impl OracleContext {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }
}

/// Four confirmation-state queries, one per `TxKind`/`SourceChainModel`
/// combination. Implementations talk to chain-specific RPC adapters that are
/// external collaborators to this crate.
#[async_trait]
pub trait ChainOracle: Send + Sync {
    async fn utxo_lock_info(
        &self,
        ctx: OracleContext,
        chain: &str,
        outpoint: &Outpoint,
    ) -> Result<UtxoLockOutcome, OracleError>;

    async fn account_lock_info(
        &self,
        ctx: OracleContext,
        lock_chain: &str,
        mint_chain: &str,
        asset: &str,
        txid: &[u8],
        payload: &[u8],
        nonce: &[u8; 32],
    ) -> Result<GenericOutcome, OracleError>;

    async fn account_burn_info(
        &self,
        ctx: OracleContext,
        chain: &str,
        asset: &str,
        txid: &[u8],
        nonce: &[u8; 32],
    ) -> Result<GenericOutcome, OracleError>;

    async fn account_burn_to_chain_info(
        &self,
        ctx: OracleContext,
        chain: &str,
        asset: &str,
        txid: &[u8],
        nonce: &[u8; 32],
    ) -> Result<GenericOutcome, OracleError>;
}
