//! Wallet types for the wallet risk engine
//!
//! This module defines the Wallet structure describing one party of a
//! proposed transfer: its address, accumulated risk score, blocked status,
//! and whether it is externally custodied.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Wallet identifier
///
/// Addresses are opaque strings; the engine never interprets them beyond
/// equality and hashing.
pub type Address = String;

/// One party of a proposed transfer
///
/// A wallet carries the risk state the decision workflow reads and updates.
/// The `risk_score` starts out absent and is only ever adjusted by the
/// defined policy operations within a single workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// Unique wallet address
    pub address: Address,

    /// Accumulated risk score
    ///
    /// `None` until first computed (by the external lookup, the stored
    /// value, or the caller seeding the context). Non-negative once set.
    pub risk_score: Option<Decimal>,

    /// Whether the wallet is blocked
    ///
    /// A blocked wallet forces rejection of any transfer it participates in.
    pub blocked: bool,

    /// Whether the wallet is externally custodied
    ///
    /// External wallets trigger the external risk lookup path. Immutable
    /// for the lifetime of a transaction.
    pub is_external: bool,
}

impl Wallet {
    /// Create a wallet with no risk score, unblocked
    pub fn new(address: impl Into<Address>, is_external: bool) -> Self {
        Wallet {
            address: address.into(),
            risk_score: None,
            blocked: false,
            is_external,
        }
    }

    /// Create an internally managed wallet
    pub fn internal(address: impl Into<Address>) -> Self {
        Wallet::new(address, false)
    }

    /// Create an externally custodied wallet
    pub fn external(address: impl Into<Address>) -> Self {
        Wallet::new(address, true)
    }

    /// Set the initial risk score (builder style)
    pub fn with_risk_score(mut self, score: Decimal) -> Self {
        self.risk_score = Some(score);
        self
    }

    /// Mark the wallet as blocked (builder style)
    pub fn with_blocked(mut self, blocked: bool) -> Self {
        self.blocked = blocked;
        self
    }

    /// The risk score, treating an absent score as zero
    ///
    /// Policy thresholds compare against this value; a wallet that has
    /// never accumulated risk contributes nothing to the combined figure.
    pub fn risk_or_zero(&self) -> Decimal {
        self.risk_score.unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_wallet_has_no_score() {
        let wallet = Wallet::internal("wallet-1");

        assert_eq!(wallet.address, "wallet-1");
        assert_eq!(wallet.risk_score, None);
        assert!(!wallet.blocked);
        assert!(!wallet.is_external);
    }

    #[test]
    fn test_external_constructor() {
        let wallet = Wallet::external("wallet-x");

        assert!(wallet.is_external);
    }

    #[test]
    fn test_builder_helpers() {
        let wallet = Wallet::internal("wallet-1")
            .with_risk_score(dec!(42))
            .with_blocked(true);

        assert_eq!(wallet.risk_score, Some(dec!(42)));
        assert!(wallet.blocked);
    }

    #[test]
    fn test_risk_or_zero() {
        let unscored = Wallet::internal("wallet-1");
        let scored = Wallet::internal("wallet-2").with_risk_score(dec!(10));

        assert_eq!(unscored.risk_or_zero(), Decimal::ZERO);
        assert_eq!(scored.risk_or_zero(), dec!(10));
    }
}
