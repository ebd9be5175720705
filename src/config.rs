//! Policy threshold configuration for the wallet risk engine
//!
//! The five policy constants are loaded once at process start by the host
//! (from whatever config source it uses — the struct is serde-deserializable)
//! and are immutable for the lifetime of the engine.
//!
//! All values are non-negative; thresholds are compared inclusively (`>=`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fixed policy thresholds applied by the decision workflow
///
/// # Fields
///
/// - `internal_risk_limit`: ceiling for the combined risk asserted by the
///   external lookup when a transfer touches an external wallet
/// - `internal_to_internal_risk_limit`: ceiling for the combined stored
///   risk of the two wallets
/// - `block_limit`: per-wallet score at or above which a rejected transfer
///   additionally blocks the sender
/// - `rejection_penalty`: multiplicative score increase applied to the
///   internal party of a rejected transfer involving an external wallet
/// - `internal_to_internal_rejection_penalty`: multiplicative score
///   increase applied to both parties of a rejected internal transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    /// Ceiling for the external-lookup combined risk (inclusive)
    pub internal_risk_limit: Decimal,

    /// Ceiling for the combined stored risk of both wallets (inclusive)
    pub internal_to_internal_risk_limit: Decimal,

    /// Per-wallet score at or above which the sender is blocked on rejection
    pub block_limit: Decimal,

    /// Penalty multiplier for the internal party when one wallet is external
    pub rejection_penalty: Decimal,

    /// Penalty multiplier for both parties when both wallets are internal
    pub internal_to_internal_rejection_penalty: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            internal_risk_limit: Decimal::new(200, 0),
            internal_to_internal_risk_limit: Decimal::new(300, 0),
            block_limit: Decimal::new(500, 0),
            rejection_penalty: Decimal::new(5, 1),
            internal_to_internal_rejection_penalty: Decimal::new(1, 1),
        }
    }
}

impl RiskLimits {
    /// Create limits, falling back to defaults for any negative value
    ///
    /// Negative thresholds and penalties are meaningless for this policy;
    /// each one is replaced by its default with a warning.
    pub fn new(
        internal_risk_limit: Decimal,
        internal_to_internal_risk_limit: Decimal,
        block_limit: Decimal,
        rejection_penalty: Decimal,
        internal_to_internal_rejection_penalty: Decimal,
    ) -> Self {
        let default = Self::default();

        let sanitize = |name: &str, value: Decimal, fallback: Decimal| {
            if value < Decimal::ZERO {
                tracing::warn!(
                    "Invalid {} ({}), using default ({})",
                    name,
                    value,
                    fallback
                );
                fallback
            } else {
                value
            }
        };

        Self {
            internal_risk_limit: sanitize(
                "internal_risk_limit",
                internal_risk_limit,
                default.internal_risk_limit,
            ),
            internal_to_internal_risk_limit: sanitize(
                "internal_to_internal_risk_limit",
                internal_to_internal_risk_limit,
                default.internal_to_internal_risk_limit,
            ),
            block_limit: sanitize("block_limit", block_limit, default.block_limit),
            rejection_penalty: sanitize(
                "rejection_penalty",
                rejection_penalty,
                default.rejection_penalty,
            ),
            internal_to_internal_rejection_penalty: sanitize(
                "internal_to_internal_rejection_penalty",
                internal_to_internal_rejection_penalty,
                default.internal_to_internal_rejection_penalty,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_limits() {
        let limits = RiskLimits::default();

        assert_eq!(limits.internal_risk_limit, dec!(200));
        assert_eq!(limits.internal_to_internal_risk_limit, dec!(300));
        assert_eq!(limits.block_limit, dec!(500));
        assert_eq!(limits.rejection_penalty, dec!(0.5));
        assert_eq!(limits.internal_to_internal_rejection_penalty, dec!(0.1));
    }

    #[test]
    fn test_new_accepts_valid_values() {
        let limits = RiskLimits::new(dec!(100), dec!(250), dec!(400), dec!(0.25), dec!(0.05));

        assert_eq!(limits.internal_risk_limit, dec!(100));
        assert_eq!(limits.internal_to_internal_risk_limit, dec!(250));
        assert_eq!(limits.block_limit, dec!(400));
        assert_eq!(limits.rejection_penalty, dec!(0.25));
        assert_eq!(limits.internal_to_internal_rejection_penalty, dec!(0.05));
    }

    #[test]
    fn test_new_replaces_negative_values_with_defaults() {
        let limits = RiskLimits::new(dec!(-1), dec!(250), dec!(-400), dec!(0.25), dec!(-0.05));
        let default = RiskLimits::default();

        assert_eq!(limits.internal_risk_limit, default.internal_risk_limit);
        assert_eq!(limits.internal_to_internal_risk_limit, dec!(250));
        assert_eq!(limits.block_limit, default.block_limit);
        assert_eq!(limits.rejection_penalty, dec!(0.25));
        assert_eq!(
            limits.internal_to_internal_rejection_penalty,
            default.internal_to_internal_rejection_penalty
        );
    }

    #[test]
    fn test_zero_values_are_accepted() {
        // Zero thresholds are extreme but legal policy (reject everything).
        let limits = RiskLimits::new(dec!(0), dec!(0), dec!(0), dec!(0), dec!(0));

        assert_eq!(limits.internal_risk_limit, Decimal::ZERO);
        assert_eq!(limits.block_limit, Decimal::ZERO);
    }
}
