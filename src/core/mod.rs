//! Core admission logic for the wallet risk engine
//!
//! This module contains the transaction admission components:
//!
//! - [`gate`] - Per-address mutual exclusion serializing workflow runs
//! - [`workflow`] - Multi-stage decision workflow (states + pure transitions)
//! - [`engine`] - Submission entry point orchestrating gate and workflow
//! - [`traits`] - Collaborator capability seams (risk lookup, score store)

pub mod engine;
pub mod gate;
pub mod traits;
pub mod workflow;

pub use engine::RiskEngine;
pub use gate::{AdmissionGate, GatePermit};
pub use traits::{RiskLookup, ScoreStore, WalletScores};
pub use workflow::{DecisionState, DecisionWorkflow};
