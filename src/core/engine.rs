//! Transaction admission orchestration
//!
//! This module provides the `RiskEngine`, the workflow entry point callers
//! submit contexts to. The engine owns the admission gate and the two
//! collaborator handles, admits each submission by acquiring both wallet
//! addresses, runs the decision workflow to a terminal verdict, and
//! releases the addresses on every exit path.
//!
//! # Architecture
//!
//! ```text
//! RiskEngine
//!     ├── AdmissionGate      (per-address mutual exclusion)
//!     ├── Arc<L: RiskLookup> (external risk-scoring service)
//!     ├── Arc<S: ScoreStore> (risk persistence store)
//!     └── Arc<RiskLimits>    (immutable policy thresholds)
//! ```
//!
//! # Thread Safety
//!
//! The engine is cheaply cloneable and safe to share across tasks. Two
//! submissions sharing a wallet address are fully serialized by the gate;
//! submissions touching disjoint address pairs run in parallel.

use std::sync::Arc;

use crate::config::RiskLimits;
use crate::core::gate::AdmissionGate;
use crate::core::traits::{RiskLookup, ScoreStore};
use crate::core::workflow::{DecisionWorkflow, DEFAULT_REJECTION_REASON};
use crate::types::{Approved, Context, Rejected, Verdict};

/// Workflow entry point for transaction admission
///
/// Generic over the two collaborator capabilities so the admission core
/// never depends on a concrete storage or network mechanism.
#[derive(Debug)]
pub struct RiskEngine<L, S> {
    /// Per-address mutual exclusion gate
    gate: AdmissionGate,

    /// External risk-scoring service
    lookup: Arc<L>,

    /// Risk persistence store
    store: Arc<S>,

    /// Policy thresholds, loaded once and immutable thereafter
    limits: Arc<RiskLimits>,
}

// Manual Clone: the collaborators are shared through Arc, so L and S do
// not themselves need to be Clone.
impl<L, S> Clone for RiskEngine<L, S> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
            lookup: Arc::clone(&self.lookup),
            store: Arc::clone(&self.store),
            limits: Arc::clone(&self.limits),
        }
    }
}

impl<L, S> RiskEngine<L, S>
where
    L: RiskLookup,
    S: ScoreStore,
{
    /// Create an engine over the given collaborators and limits
    ///
    /// The engine starts with a fresh admission gate of its own; engines
    /// never share held-address state unless cloned from one another.
    pub fn new(lookup: Arc<L>, store: Arc<S>, limits: RiskLimits) -> Self {
        Self {
            gate: AdmissionGate::new(),
            lookup,
            store,
            limits: Arc::new(limits),
        }
    }

    /// The engine's admission gate
    ///
    /// Exposed so hosts and test harnesses can observe held addresses.
    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// The engine's policy thresholds
    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Submit one proposed transfer for admission and decision
    ///
    /// Blocks until both wallet addresses are free, runs the decision
    /// workflow while holding them, and releases them before returning —
    /// on every path, including collaborator failures. Exactly one of the
    /// two outcome variants is returned per submission.
    pub async fn submit(&self, mut context: Context) -> Result<Approved, Rejected> {
        let _permit = self
            .gate
            .acquire(&context.sender.address, &context.receiver.address)
            .await;

        tracing::debug!(
            sender = %context.sender.address,
            receiver = %context.receiver.address,
            amount = %context.transaction.amount,
            "transaction admitted"
        );

        let workflow =
            DecisionWorkflow::new(self.lookup.as_ref(), self.store.as_ref(), &self.limits);
        let verdict = workflow.run(&mut context).await;

        match verdict {
            Verdict::Approved => Ok(Approved { context }),
            Verdict::Rejected => {
                let reason = context
                    .transaction
                    .rejection_reason
                    .clone()
                    .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());
                Err(Rejected { context, reason })
            }
        }
        // _permit drops here, releasing both addresses.
    }
}
