//! Wallet Risk Engine Library
//! # Overview
//!
//! This library decides, for a proposed transfer between two wallets,
//! whether to approve or reject it, based on accumulated risk scores,
//! blocking status, and (for transfers touching an external wallet) an
//! externally supplied risk lookup.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Wallet, Transaction, Context, errors)
//! - [`config`] - Policy thresholds ([`RiskLimits`])
//! - [`core`] - Business logic components:
//!   - [`core::gate`] - Per-address admission gate serializing workflow runs
//!   - [`core::workflow`] - Multi-stage decision workflow
//!   - [`core::engine`] - Submission orchestration
//!   - [`core::traits`] - Collaborator seams (risk lookup, score store)
//! - [`store`] - Bundled in-memory collaborator implementations
//!
//! # Decision Workflow
//!
//! Each submitted transfer runs through a deterministic state machine:
//!
//! - **Start**: routes on external custody and receiver blocking
//! - **ExternalRiskLookup**: fetches asserted risk when a wallet is external
//! - **RefreshRiskScores**: re-reads authoritative stored scores, applies
//!   the combined policy
//! - **CheckApproval / BlockWallet**: routes to a terminal, blocking the
//!   sender when a score reaches the block limit
//! - **Reject / Approve**: terminal states; reject applies the rejection
//!   penalty, both persist the context exactly once
//!
//! # Concurrency
//!
//! Two submissions sharing a wallet address are fully serialized by the
//! [`AdmissionGate`]; submissions touching disjoint address pairs run in
//! parallel. Release is RAII and happens on every exit path.

// Module declarations
pub mod config;
pub mod core;
pub mod store;
pub mod types;

pub use config::RiskLimits;
pub use self::core::{
    AdmissionGate, DecisionState, DecisionWorkflow, GatePermit, RiskEngine, RiskLookup,
    ScoreStore, WalletScores,
};
pub use store::{MemoryRiskLookup, MemoryScoreStore, WalletRecord};
pub use types::{Address, Approved, Context, Rejected, RiskError, Transaction, Verdict, Wallet};
