//! Confirmer: two concurrent periodic loops over the Transaction Store.

use crate::config::ConfirmerConfig;
use crate::error::ConfirmerError;
use futures::future::join_all;
use lightnode_dispatcher::{AggregationPolicy, Dispatcher};
use lightnode_oracle::{ChainOracle, GenericOutcome, OracleContext, Outpoint, UtxoLockOutcome};
use lightnode_store::{PeerStoreTrait, TxStore};
use lightnode_types::{
    clock::Clock, shutdown::ShutdownRecv, SourceChainModel, Tx, TxInput, TxKind, TxStatus,
};
use std::sync::Arc;

pub struct Confirmer {
    store: Arc<dyn TxStore>,
    oracle: Arc<dyn ChainOracle>,
    dispatcher: Arc<Dispatcher>,
    peer_store: Arc<dyn PeerStoreTrait>,
    clock: Arc<dyn Clock>,
    config: ConfirmerConfig,
}

impl Confirmer {
    pub fn new(
        store: Arc<dyn TxStore>,
        oracle: Arc<dyn ChainOracle>,
        dispatcher: Arc<Dispatcher>,
        peer_store: Arc<dyn PeerStoreTrait>,
        clock: Arc<dyn Clock>,
        config: ConfirmerConfig,
    ) -> Self {
        Self { store, oracle, dispatcher, peer_store, clock, config }
    }

    /// Runs both loops until `shutdown` fires. The prune loop runs once
    /// immediately, then hourly; the confirmation loop runs every tick.
    pub async fn run(self: Arc<Self>, mut shutdown: ShutdownRecv) {
        let confirm_handle = {
            let this = self.clone();
            let mut shutdown = shutdown.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(this.config.poll_interval);
                loop {
                    tokio::select! {
                        _ = ticker.tick() => this.confirmation_tick().await,
                        _ = shutdown.recv() => return,
                    }
                }
            })
        };

        let prune_handle = {
            let this = self.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(std::time::Duration::from_secs(3600));
                loop {
                    this.prune_tick();
                    tokio::select! {
                        _ = ticker.tick() => {}
                        _ = shutdown.recv() => return,
                    }
                }
            })
        };

        let _ = confirm_handle.await;
        let _ = prune_handle.await;
    }

    pub async fn confirmation_tick(&self) {
        let now = self.clock.now_unix();
        let pending = match self.store.pending_txs(ConfirmerConfig::PENDING_WINDOW.as_secs(), now) {
            Ok(pending) => pending,
            Err(e) => {
                let err = ConfirmerError::from(e);
                if err.kind().is_retryable_by_confirmer() {
                    tracing::warn!(error = %err, "failed to load pending txs, retrying next tick");
                } else {
                    tracing::error!(error = %err, "failed to load pending txs");
                }
                return;
            }
        };

        let deadline = tokio::time::Instant::now() + self.config.poll_interval;
        let tasks = pending.into_iter().map(|tx| self.process_tx(tx));
        let _ = tokio::time::timeout_at(deadline, join_all(tasks)).await;
    }

    async fn process_tx(&self, tx: Tx) {
        let ctx = OracleContext::new(self.config.poll_interval);
        let promote = match (tx.selector.kind, tx.selector.source_model) {
            (TxKind::Lock, SourceChainModel::Utxo) => self.poll_utxo_lock(&tx, ctx).await,
            (TxKind::Lock, SourceChainModel::Account) => self.poll_account_lock(&tx, ctx).await,
            (TxKind::Burn, _) => self.poll_account_burn(&tx, ctx).await,
            (TxKind::BurnAndMint, _) => self.poll_account_burn_to_chain(&tx, ctx).await,
        };
        if promote {
            self.confirm(tx).await;
        }
    }

    async fn poll_utxo_lock(&self, tx: &Tx, ctx: OracleContext) -> bool {
        let TxInput::UtxoLock { txid, txindex, .. } = &tx.input else {
            tracing::error!(hash = %tx.hash, "utxo-model lock tx has a non-utxo input, skipping");
            return false;
        };
        let outpoint = Outpoint { txid: txid.clone(), txindex: *txindex };
        match self.oracle.utxo_lock_info(ctx, &tx.selector.source_chain, &outpoint).await {
            Ok(UtxoLockOutcome::Ok) => true,
            Ok(UtxoLockOutcome::InsufficientConfirmations) => {
                tracing::info!(hash = %tx.hash, "utxo lock has insufficient confirmations");
                false
            }
            Ok(UtxoLockOutcome::AlreadySpent) => {
                self.update_status_logged(&tx.hash, TxStatus::Confirmed);
                false
            }
            Ok(UtxoLockOutcome::Other(msg)) => {
                tracing::error!(hash = %tx.hash, message = %msg, "chain oracle reported an opaque error");
                false
            }
            Err(e) => {
                let err = ConfirmerError::from(e);
                if err.kind().is_retryable_by_confirmer() {
                    tracing::warn!(hash = %tx.hash, error = %err, "chain oracle call failed, retrying next tick");
                } else {
                    tracing::error!(hash = %tx.hash, error = %err, "chain oracle call failed");
                }
                false
            }
        }
    }

    async fn poll_account_lock(&self, tx: &Tx, ctx: OracleContext) -> bool {
        let TxInput::AccountLock { txid, nonce, payload, .. } = &tx.input else {
            tracing::error!(hash = %tx.hash, "account-model lock tx has a mismatched input, skipping");
            return false;
        };
        let outcome = self
            .oracle
            .account_lock_info(
                ctx,
                &tx.selector.source_chain,
                &tx.selector.dest_chain,
                &tx.selector.asset,
                txid,
                payload,
                nonce,
            )
            .await;
        self.handle_generic_outcome(tx, outcome)
    }

    async fn poll_account_burn(&self, tx: &Tx, ctx: OracleContext) -> bool {
        let TxInput::Burn { txid, nonce, .. } = &tx.input else {
            tracing::error!(hash = %tx.hash, "burn tx has a mismatched input, skipping");
            return false;
        };
        let outcome = self
            .oracle
            .account_burn_info(ctx, &tx.selector.source_chain, &tx.selector.asset, txid, nonce)
            .await;
        self.handle_generic_outcome(tx, outcome)
    }

    async fn poll_account_burn_to_chain(&self, tx: &Tx, ctx: OracleContext) -> bool {
        let TxInput::BurnToChain { txid, nonce, .. } = &tx.input else {
            tracing::error!(hash = %tx.hash, "burn-and-mint tx has a mismatched input, skipping");
            return false;
        };
        let outcome = self
            .oracle
            .account_burn_to_chain_info(ctx, &tx.selector.source_chain, &tx.selector.asset, txid, nonce)
            .await;
        self.handle_generic_outcome(tx, outcome)
    }

    fn handle_generic_outcome(&self, tx: &Tx, outcome: Result<GenericOutcome, lightnode_oracle::OracleError>) -> bool {
        match outcome {
            Ok(GenericOutcome::Ok) => true,
            Ok(GenericOutcome::InsufficientConfirmations) => {
                tracing::info!(hash = %tx.hash, "tx has insufficient confirmations");
                false
            }
            Ok(GenericOutcome::Other(msg)) => {
                tracing::error!(hash = %tx.hash, message = %msg, "chain oracle reported an opaque error");
                false
            }
            Err(e) => {
                let err = ConfirmerError::from(e);
                if err.kind().is_retryable_by_confirmer() {
                    tracing::warn!(hash = %tx.hash, error = %err, "chain oracle call failed, retrying next tick");
                } else {
                    tracing::error!(hash = %tx.hash, error = %err, "chain oracle call failed");
                }
                false
            }
        }
    }

    /// Promotion: submit to the Dispatcher with the full known peer set and
    /// move the Tx to `confirmed` on success, or on the legacy "already
    /// done" substring compatibility path.
    async fn confirm(&self, tx: Tx) {
        let peers: Vec<_> = self.peer_store.addrs_all().into_iter().map(|p| p.id).collect();
        let params = serde_json::json!({
            "hash": tx.hash.to_string(),
            "selector": tx.selector.to_string(),
        });
        match self
            .dispatcher
            .call("submitTx", params, peers, self.config.dispatcher_timeout, AggregationPolicy::SendMessage)
            .await
        {
            Ok(_) => self.update_status_logged(&tx.hash, TxStatus::Confirmed),
            Err(lightnode_dispatcher::DispatchError::QueueFull) => {
                tracing::warn!(hash = %tx.hash, "dispatcher queue full, tx stays pending");
            }
            Err(e) => {
                if e.last_response_text().is_some_and(indicates_done) {
                    self.update_status_logged(&tx.hash, TxStatus::Confirmed);
                } else {
                    tracing::warn!(hash = %tx.hash, error = %e, "promotion did not succeed, tx stays pending");
                }
            }
        }
    }

    fn update_status_logged(&self, hash: &lightnode_types::TxHash, status: TxStatus) {
        if let Err(e) = self.store.update_status(hash, status) {
            tracing::error!(hash = %hash, error = %e, "failed to persist status update");
        }
    }

    fn prune_tick(&self) {
        let now = self.clock.now_unix();
        match self.store.prune(self.config.expiry.as_secs(), now) {
            Ok(removed) if removed > 0 => tracing::info!(removed, "pruned expired txs"),
            Ok(_) => {}
            Err(e) => {
                let err = ConfirmerError::from(e);
                if err.kind().is_retryable_by_confirmer() {
                    tracing::warn!(error = %err, "prune failed, retrying next tick");
                } else {
                    tracing::error!(error = %err, "prune failed");
                }
            }
        }
    }
}

/// Legacy compatibility shim: the Darknodes' own error text, not a
/// structured field, is how "this tx is already done" is communicated on
/// the wire today. Kept as a documented one-release fallback.
fn indicates_done(message: &str) -> bool {
    message.contains("status=done") || message.contains("status = done")
}
