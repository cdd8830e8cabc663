//! Chain Oracle outcome types.
//!
//! `UtxoLockOutcome` and `GenericOutcome` are deliberately separate types
//! rather than one enum with an unreachable variant: `AccountLockInfo`,
//! `AccountBurnInfo`, and `AccountBurnToChainInfo` have no `already-spent`
//! case, so the Confirmer cannot accidentally fast-forward a non-UTXO lock
//! to `confirmed` on a nil result.

/// Outcome of `UTXOLockInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtxoLockOutcome {
    Ok,
    InsufficientConfirmations,
    /// The source output has been consumed downstream (a "result is nil"
    /// condition on the wire). The Confirmer treats this as done.
    AlreadySpent,
    Other(String),
}

/// Outcome of `AccountLockInfo`, `AccountBurnInfo`, `AccountBurnToChainInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenericOutcome {
    Ok,
    InsufficientConfirmations,
    Other(String),
}

/// Classifies a legacy chain-adapter error message by substring match.
///
/// Kept as a one-release compatibility shim per the design note that
/// preserving the substring match is acceptable while the oracle trait
/// itself returns enumerated outcomes. New call sites should consult the
/// enum returned by the oracle trait methods, never this function.
pub fn classify_legacy_message(message: &str) -> LegacyClass {
    if message.contains("insufficient-confirmations") {
        LegacyClass::InsufficientConfirmations
    } else if message.contains("result is nil") {
        LegacyClass::AlreadySpent
    } else {
        LegacyClass::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyClass {
    InsufficientConfirmations,
    AlreadySpent,
    Other,
}
