//! Transaction and context types for the wallet risk engine
//!
//! This module defines the Transaction outcome record, the per-submission
//! Context owned by exactly one workflow run, and the caller-visible
//! Approved/Rejected results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::wallet::{Address, Wallet};

/// A proposed transfer and its outcome fields
///
/// The outcome fields are unset until the workflow resolves; afterwards
/// exactly one of `approved` / `rejected` holds, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender wallet address
    pub sender: Address,

    /// Receiver wallet address
    pub receiver: Address,

    /// Transfer amount
    pub amount: Decimal,

    /// Whether the transfer was approved
    pub approved: bool,

    /// Whether the transfer was rejected
    pub rejected: bool,

    /// Human-readable reason for rejection, if rejected
    pub rejection_reason: Option<String>,
}

impl Transaction {
    /// Create an unresolved transaction between two addresses
    pub fn new(sender: impl Into<Address>, receiver: impl Into<Address>, amount: Decimal) -> Self {
        Transaction {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            approved: false,
            rejected: false,
            rejection_reason: None,
        }
    }
}

/// The unit of work for one decision workflow run
///
/// A context owns exactly one sender wallet, one receiver wallet, and one
/// transaction, plus the transient `total_risk` seeded by the external
/// lookup stage. It is created per incoming transfer request, processed by
/// exactly one workflow run while the admission gate holds both addresses,
/// and persisted via the score store once the run reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// The sending wallet
    pub sender: Wallet,

    /// The receiving wallet
    pub receiver: Wallet,

    /// The proposed transfer and its outcome fields
    pub transaction: Transaction,

    /// Sum of both risk scores as asserted by the external lookup
    ///
    /// Only used for the internal-risk-limit threshold test; the stored
    /// scores re-read afterwards are authoritative.
    pub total_risk: Option<Decimal>,
}

impl Context {
    /// Create a context for a transfer of `amount` between two wallets
    pub fn new(sender: Wallet, receiver: Wallet, amount: Decimal) -> Self {
        let transaction =
            Transaction::new(sender.address.clone(), receiver.address.clone(), amount);
        Context {
            sender,
            receiver,
            transaction,
            total_risk: None,
        }
    }
}

/// Terminal outcome of a decision workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The transfer was approved
    Approved,
    /// The transfer was rejected
    Rejected,
}

/// Caller-visible success result
///
/// Carries the resolved context so callers can observe the final risk
/// scores and blocked flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Approved {
    /// The resolved context, as persisted
    pub context: Context,
}

/// Caller-visible rejection result
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    /// The resolved context, as persisted
    pub context: Context,

    /// Human-readable reason for the rejection
    pub reason: String,
}
