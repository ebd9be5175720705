//! Core data types for the wallet risk engine
//!
//! This module contains all the fundamental types used throughout
//! the admission core:
//!
//! - [`wallet`] - Wallet state (address, risk score, blocked, external)
//! - [`transaction`] - Transaction outcome record, per-run Context, verdicts
//! - [`error`] - Collaborator error taxonomy

pub mod error;
pub mod transaction;
pub mod wallet;

pub use error::RiskError;
pub use transaction::{Approved, Context, Rejected, Transaction, Verdict};
pub use wallet::{Address, Wallet};
