//! Collaborator traits for the decision workflow
//!
//! This module defines the two capability seams the workflow depends on:
//! the external risk lookup and the risk persistence store. The workflow
//! core has no dependency on any particular storage or network mechanism —
//! only on these contracts.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::types::{Context, RiskError};

/// Risk figures for the two parties of a transfer
///
/// Returned by both collaborator reads: the external lookup (asserted
/// figures) and the score store (authoritative stored figures).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletScores {
    /// Risk score attributed to the sender
    pub sender: Decimal,

    /// Risk score attributed to the receiver
    pub receiver: Decimal,
}

impl WalletScores {
    /// Create a score pair
    pub fn new(sender: Decimal, receiver: Decimal) -> Self {
        Self { sender, receiver }
    }

    /// Combined risk of both parties
    pub fn total(&self) -> Decimal {
        self.sender + self.receiver
    }
}

/// External risk-scoring service
///
/// A black box returning a risk figure per address, consulted when a
/// transfer touches an externally custodied wallet. A failure is treated
/// as fail-closed by the workflow: the transfer is rejected, not retried.
#[async_trait]
pub trait RiskLookup: Send + Sync {
    /// Fetch externally asserted risk figures for both addresses
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::LookupFailed`] if either address is unknown to
    /// the service or the service is unreachable.
    async fn external_risk(&self, sender: &str, receiver: &str)
        -> Result<WalletScores, RiskError>;
}

/// Risk persistence store
///
/// Key-value storage of per-wallet risk state keyed by address. The stored
/// scores are authoritative: the workflow re-reads them before its policy
/// check, superseding anything the external lookup asserted.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Load the stored risk scores for both addresses
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::ScoreNotFound`] if either address has no stored
    /// score, or [`RiskError::StoreError`] if the store is unreachable.
    async fn load_scores(&self, sender: &str, receiver: &str)
        -> Result<WalletScores, RiskError>;

    /// Persist both wallets' risk score and blocked flag, keyed by address
    ///
    /// Called exactly once per workflow run, at the terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::StoreError`] if the write fails.
    async fn save(&self, context: &Context) -> Result<(), RiskError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_wallet_scores_total() {
        let scores = WalletScores::new(dec!(80), dec!(40));

        assert_eq!(scores.total(), dec!(120));
    }
}
