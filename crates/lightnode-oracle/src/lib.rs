//! Chain Oracle: queries source chains for the confirmation state of a
//! pending transaction. Four capabilities, one per `TxKind` /
//! `SourceChainModel` combination; see [`ChainOracle`].

pub mod error;
pub mod json_rpc_oracle;
pub mod oracle;
pub mod outcome;

pub use error::OracleError;
pub use json_rpc_oracle::JsonRpcChainOracle;
pub use oracle::{ChainOracle, OracleContext, Outpoint};
pub use outcome::{classify_legacy_message, GenericOutcome, LegacyClass, UtxoLockOutcome};

#[cfg(test)]
mod mock_tests {
    use super::*;
    use mockall::mock;

    mock! {
        pub Oracle {}

        #[async_trait::async_trait]
        impl ChainOracle for Oracle {
            async fn utxo_lock_info(
                &self,
                ctx: OracleContext,
                chain: &str,
                outpoint: &oracle::Outpoint,
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
    }

    #[tokio::test]
    async fn mock_oracle_reports_already_spent() {
        let mut mock = MockOracle::new();
        mock.expect_utxo_lock_info()
            .returning(|_, _, _| Box::pin(async { Ok(UtxoLockOutcome::AlreadySpent) }));

        let outcome = mock
            .utxo_lock_info(
                OracleContext::new(std::time::Duration::from_secs(1)),
                "Bitcoin",
                &oracle::Outpoint { txid: vec![1, 2, 3], txindex: 0 },
            )
            .await
            .unwrap();
        assert_eq!(outcome, UtxoLockOutcome::AlreadySpent);
    }
}
