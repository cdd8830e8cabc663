//! Confirmer tuning knobs.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ConfirmerConfig {
    /// Confirmation loop tick period.
    pub poll_interval: Duration,
    /// Tx age before pruning.
    pub expiry: Duration,
    /// Deadline for the promotion Dispatcher call.
    pub dispatcher_timeout: Duration,
}

impl ConfirmerConfig {
    /// `PendingTxs` window: the Confirmer only polls Txs first seen within
    /// the last 72 hours.
    pub const PENDING_WINDOW: Duration = Duration::from_secs(72 * 3600);
}

impl Default for ConfirmerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            expiry: Duration::from_secs(14 * 24 * 3600),
            dispatcher_timeout: Duration::from_secs(30),
        }
    }
}
