//! Error types for the wallet risk engine
//!
//! This module defines all error types surfaced by the external
//! collaborators (risk lookup and score store). A rejected transfer is not
//! an error — it is a normal verdict; these types cover infrastructure
//! failures only, all of which the workflow treats as fail-closed.
//!
//! # Error Categories
//!
//! - **Lookup Errors**: external risk service unreachable or asked about an
//!   unknown address
//! - **Store Errors**: persistence unreachable, missing stored scores, or a
//!   failed write

use thiserror::Error;

/// Main error type for the wallet risk engine
///
/// Each variant includes enough context to diagnose which collaborator
/// failed and for which wallet address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskError {
    /// The external risk lookup failed
    ///
    /// Raised when the external risk service is unreachable or does not
    /// know one of the addresses. The workflow rejects the transfer
    /// without applying a penalty beyond what the stage already computed.
    #[error("External risk lookup failed for {address}: {message}")]
    LookupFailed {
        /// Address the lookup was asked about
        address: String,
        /// Description of the failure
        message: String,
    },

    /// No stored risk score exists for an address
    ///
    /// Raised by the score store when asked to load scores for a wallet it
    /// has never persisted. The workflow rejects the transfer.
    #[error("No stored risk score for address {address}")]
    ScoreNotFound {
        /// Address with no stored score
        address: String,
    },

    /// The persistence store failed
    ///
    /// Raised when the backing store is unreachable or a write fails.
    /// During a terminal state this is logged; the verdict stays rejected
    /// (or flips an approval to a rejection, fail-closed).
    #[error("Risk store error: {message}")]
    StoreError {
        /// Description of the store failure
        message: String,
    },
}

// Helper functions for creating common errors

impl RiskError {
    /// Create a LookupFailed error
    pub fn lookup_failed(address: &str, message: &str) -> Self {
        RiskError::LookupFailed {
            address: address.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a ScoreNotFound error
    pub fn score_not_found(address: &str) -> Self {
        RiskError::ScoreNotFound {
            address: address.to_string(),
        }
    }

    /// Create a StoreError
    pub fn store_error(message: &str) -> Self {
        RiskError::StoreError {
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::lookup_failed(
        RiskError::lookup_failed("wallet-1", "service unreachable"),
        "External risk lookup failed for wallet-1: service unreachable"
    )]
    #[case::score_not_found(
        RiskError::ScoreNotFound { address: "wallet-2".to_string() },
        "No stored risk score for address wallet-2"
    )]
    #[case::store_error(
        RiskError::StoreError { message: "write conflict".to_string() },
        "Risk store error: write conflict"
    )]
    fn test_error_display(#[case] error: RiskError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::lookup_failed(
        RiskError::lookup_failed("wallet-1", "timeout"),
        RiskError::LookupFailed { address: "wallet-1".to_string(), message: "timeout".to_string() }
    )]
    #[case::score_not_found(
        RiskError::score_not_found("wallet-2"),
        RiskError::ScoreNotFound { address: "wallet-2".to_string() }
    )]
    #[case::store_error(
        RiskError::store_error("disk full"),
        RiskError::StoreError { message: "disk full".to_string() }
    )]
    fn test_helper_functions(#[case] result: RiskError, #[case] expected: RiskError) {
        assert_eq!(result, expected);
    }
}
