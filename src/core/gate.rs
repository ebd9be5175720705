//! Per-address admission gate serializing workflow runs
//!
//! This module provides the `AdmissionGate`, the single shared-mutable
//! resource discipline in the system: no two in-flight workflow runs may
//! hold the same wallet address. A run acquires both the sender's and
//! receiver's addresses atomically with respect to each other before its
//! workflow starts, and releases them when the run terminates.
//!
//! # Design
//!
//! The gate keeps the set of held addresses behind a `Mutex<HashSet>` and
//! wakes waiters through a `tokio::sync::Notify`. An acquiring task always
//! tests **both** addresses together under the mutex and only commits when
//! both are free — it never holds one address while waiting for the other,
//! so two tasks contending on the reverse pair cannot deadlock.
//!
//! Release is RAII: dropping the [`GatePermit`] frees both addresses on
//! every exit path (normal completion, collaborator failure, panic, or
//! task cancellation).
//!
//! # Thread Safety
//!
//! The gate is a cheaply cloneable handle over shared state and is safe to
//! share across tasks. It is an explicitly owned value injected into the
//! engine — there is no ambient global set — so independent engines and
//! test harnesses cannot cross-contaminate.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;

use crate::types::Address;

/// Shared gate state
#[derive(Debug, Default)]
struct GateInner {
    /// Addresses currently held by in-flight workflow runs
    held: Mutex<HashSet<Address>>,

    /// Signalled whenever a permit is released
    freed: Notify,
}

impl GateInner {
    /// Lock the held set, recovering from poisoning
    ///
    /// No critical section leaves the set mid-update, so a poisoned mutex
    /// still holds a consistent set. Recovering keeps release working in
    /// `Drop` during unwinding, where a second panic would abort.
    fn held(&self) -> MutexGuard<'_, HashSet<Address>> {
        self.held.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Per-address mutual exclusion gate
///
/// Cloning the gate yields another handle to the same held-address set.
#[derive(Debug, Clone, Default)]
pub struct AdmissionGate {
    inner: Arc<GateInner>,
}

impl AdmissionGate {
    /// Create a gate with no held addresses
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire both addresses, waiting until neither is held
    ///
    /// Blocks the calling task (without holding partial locks) until both
    /// addresses are free, then marks both as held in one step. A
    /// self-transfer (`sender == receiver`) degenerates to a single held
    /// entry and behaves correctly.
    ///
    /// Acquisition itself cannot fail and carries no timeout; the returned
    /// [`GatePermit`] frees both addresses when dropped.
    pub async fn acquire(&self, sender: &str, receiver: &str) -> GatePermit {
        loop {
            // Register for the release signal before checking, so a release
            // between the check and the await cannot be missed.
            let notified = self.inner.freed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut held = self.inner.held();
                if !held.contains(sender) && !held.contains(receiver) {
                    held.insert(sender.to_string());
                    held.insert(receiver.to_string());
                    return GatePermit {
                        inner: Arc::clone(&self.inner),
                        sender: sender.to_string(),
                        receiver: receiver.to_string(),
                    };
                }
            }

            notified.await;
        }
    }

    /// Whether an address is currently held by an in-flight run
    ///
    /// A snapshot; the status may change immediately after this returns.
    pub fn is_held(&self, address: &str) -> bool {
        self.inner.held().contains(address)
    }
}

/// Exclusive hold on a sender/receiver address pair
///
/// Both addresses stay held by the owning workflow run until the permit is
/// dropped. Dropping releases them unconditionally and wakes all waiting
/// acquirers, which re-check their own address pairs.
#[derive(Debug)]
pub struct GatePermit {
    inner: Arc<GateInner>,
    sender: Address,
    receiver: Address,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        {
            let mut held = self.inner.held();
            held.remove(&self.sender);
            held.remove(&self.receiver);
        }
        self.inner.freed.notify_waiters();
    }
}
