//! `reqwest`-based `ChainOracle` that calls a configured chain-adapter
//! endpoint per chain name.
//!
//! The adapter's wire format is an external interface (see the configuration
//! and chain-specific-client collaborators this crate treats as opaque); the
//! envelope below is the one this Lightnode speaks and is deliberately
//! narrow, carrying a `status` the enum-mapping below trusts first and a
//! free-form `message` the legacy substring shim only consults as a
//! fallback.

use crate::{
    error::OracleError,
    oracle::{ChainOracle, OracleContext, Outpoint},
    outcome::{classify_legacy_message, GenericOutcome, LegacyClass, UtxoLockOutcome},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct AdapterRequest<'a> {
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct AdapterResponse {
    status: Option<String>,
    message: Option<String>,
}

/// Calls one HTTP endpoint per chain name, each fronting a chain-specific
/// RPC adapter (UTXO lookup, EVM log filter, account nonce lookup, ...).
pub struct JsonRpcChainOracle {
    client: reqwest::Client,
    endpoints: HashMap<String, String>,
}

impl JsonRpcChainOracle {
    pub fn new(endpoints: HashMap<String, String>) -> Self {
        Self { client: reqwest::Client::new(), endpoints }
    }

    fn endpoint(&self, chain: &str) -> Result<&str, OracleError> {
        self.endpoints
            .get(chain)
            .map(String::as_str)
            .ok_or_else(|| OracleError::Other(format!("no chain adapter configured for {chain}")))
    }

    async fn call(
        &self,
        ctx: OracleContext,
        chain: &str,
        method: &str,
        params: serde_json::Value,
    ) -> Result<AdapterResponse, OracleError> {
        let url = self.endpoint(chain)?;
        let request = self.client.post(url).json(&AdapterRequest { method, params }).send();
        let response = tokio::time::timeout(ctx.deadline, request)
            .await
            .map_err(|_| OracleError::DeadlineExceeded)??;
        let body: AdapterResponse = response.json().await?;
        Ok(body)
    }

    fn to_generic(resp: AdapterResponse) -> GenericOutcome {
        match resp.status.as_deref() {
            Some("ok") => GenericOutcome::Ok,
            Some("insufficient-confirmations") => GenericOutcome::InsufficientConfirmations,
            _ => {
                let message = resp.message.unwrap_or_default();
                match classify_legacy_message(&message) {
                    LegacyClass::InsufficientConfirmations => GenericOutcome::InsufficientConfirmations,
                    _ => GenericOutcome::Other(message),
                }
            }
        }
    }
}

#[async_trait]
impl ChainOracle for JsonRpcChainOracle {
    async fn utxo_lock_info(
        &self,
        ctx: OracleContext,
        chain: &str,
        outpoint: &Outpoint,
    ) -> Result<UtxoLockOutcome, OracleError> {
        let params = serde_json::json!({
            "txid": hex::encode(&outpoint.txid),
            "txindex": outpoint.txindex,
        });
        let resp = self.call(ctx, chain, "lockInfo", params).await?;
        Ok(match resp.status.as_deref() {
            Some("ok") => UtxoLockOutcome::Ok,
            Some("insufficient-confirmations") => UtxoLockOutcome::InsufficientConfirmations,
            Some("already-spent") => UtxoLockOutcome::AlreadySpent,
            _ => {
                let message = resp.message.unwrap_or_default();
                match classify_legacy_message(&message) {
                    LegacyClass::InsufficientConfirmations => UtxoLockOutcome::InsufficientConfirmations,
                    LegacyClass::AlreadySpent => UtxoLockOutcome::AlreadySpent,
                    LegacyClass::Other => UtxoLockOutcome::Other(message),
                }
            }
        })
    }

    async fn account_lock_info(
        &self,
        ctx: OracleContext,
        lock_chain: &str,
        mint_chain: &str,
        asset: &str,
        txid: &[u8],
        payload: &[u8],
        nonce: &[u8; 32],
    ) -> Result<GenericOutcome, OracleError> {
        let params = serde_json::json!({
            "mintChain": mint_chain,
            "asset": asset,
            "txid": hex::encode(txid),
            "payload": hex::encode(payload),
            "nonce": hex::encode(nonce),
        });
        let resp = self.call(ctx, lock_chain, "accountLockInfo", params).await?;
        Ok(Self::to_generic(resp))
    }

    async fn account_burn_info(
        &self,
        ctx: OracleContext,
        chain: &str,
        asset: &str,
        txid: &[u8],
        nonce: &[u8; 32],
    ) -> Result<GenericOutcome, OracleError> {
        let params = serde_json::json!({
            "asset": asset,
            "txid": hex::encode(txid),
            "nonce": hex::encode(nonce),
        });
        let resp = self.call(ctx, chain, "accountBurnInfo", params).await?;
        Ok(Self::to_generic(resp))
    }

    async fn account_burn_to_chain_info(
        &self,
        ctx: OracleContext,
        chain: &str,
        asset: &str,
        txid: &[u8],
        nonce: &[u8; 32],
    ) -> Result<GenericOutcome, OracleError> {
        let params = serde_json::json!({
            "asset": asset,
            "txid": hex::encode(txid),
            "nonce": hex::encode(nonce),
        });
        let resp = self.call(ctx, chain, "accountBurnToChainInfo", params).await?;
        Ok(Self::to_generic(resp))
    }
}

#[allow(unused)]
fn _assert_send_sync(_: &dyn ChainOracle) {}
