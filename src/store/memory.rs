//! In-memory collaborator implementations
//!
//! This module provides DashMap-backed implementations of the two
//! collaborator traits: an external risk lookup serving pre-seeded risk
//! figures, and a score store persisting per-wallet risk state.
//!
//! # Design
//!
//! Both use `DashMap` for fine-grained per-entry locking, so submissions
//! touching disjoint wallets never contend inside the store. The admission
//! gate is what serializes submissions sharing a wallet; these stores only
//! need each individual read/write to be consistent.
//!
//! They back the engine in tests and in hosts that want a process-local
//! store; production hosts supply their own trait implementations.

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::core::traits::{RiskLookup, ScoreStore, WalletScores};
use crate::types::{Address, Context, RiskError, Wallet};

/// Per-wallet state as persisted by the score store
#[derive(Debug, Clone, PartialEq)]
pub struct WalletRecord {
    /// Stored risk score
    pub risk_score: Decimal,

    /// Stored blocked flag
    pub blocked: bool,
}

/// In-memory external risk-scoring service
///
/// Serves the risk figure seeded per address; an address it has never
/// seen fails the lookup, mirroring a real service that only answers for
/// wallets it tracks.
#[derive(Debug, Default)]
pub struct MemoryRiskLookup {
    risks: DashMap<Address, Decimal>,
}

impl MemoryRiskLookup {
    /// Create an empty lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the risk figure the service asserts for an address
    pub fn seed(&self, address: &str, risk: Decimal) {
        self.risks.insert(address.to_string(), risk);
    }

    fn risk_for(&self, address: &str) -> Result<Decimal, RiskError> {
        self.risks
            .get(address)
            .map(|entry| *entry.value())
            .ok_or_else(|| RiskError::lookup_failed(address, "address unknown to risk service"))
    }
}

#[async_trait]
impl RiskLookup for MemoryRiskLookup {
    async fn external_risk(
        &self,
        sender: &str,
        receiver: &str,
    ) -> Result<WalletScores, RiskError> {
        Ok(WalletScores::new(
            self.risk_for(sender)?,
            self.risk_for(receiver)?,
        ))
    }
}

/// In-memory risk persistence store
///
/// Keyed by wallet address; `save` upserts both parties of a context in
/// one call, each entry written atomically under its DashMap shard lock.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    records: DashMap<Address, WalletRecord>,
}

impl MemoryScoreStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored record for an address
    pub fn seed(&self, address: &str, risk_score: Decimal, blocked: bool) {
        self.records.insert(
            address.to_string(),
            WalletRecord {
                risk_score,
                blocked,
            },
        );
    }

    /// Snapshot the stored record for an address, if any
    pub fn record(&self, address: &str) -> Option<WalletRecord> {
        self.records.get(address).map(|entry| entry.value().clone())
    }

    fn score_for(&self, address: &str) -> Result<Decimal, RiskError> {
        self.records
            .get(address)
            .map(|entry| entry.value().risk_score)
            .ok_or_else(|| RiskError::score_not_found(address))
    }

    fn persist_wallet(&self, wallet: &Wallet) {
        let mut entry = self
            .records
            .entry(wallet.address.clone())
            .or_insert_with(|| WalletRecord {
                risk_score: Decimal::ZERO,
                blocked: false,
            });
        // A wallet whose score was never computed keeps its stored value.
        if let Some(score) = wallet.risk_score {
            entry.risk_score = score;
        }
        entry.blocked = wallet.blocked;
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn load_scores(
        &self,
        sender: &str,
        receiver: &str,
    ) -> Result<WalletScores, RiskError> {
        Ok(WalletScores::new(
            self.score_for(sender)?,
            self.score_for(receiver)?,
        ))
    }

    async fn save(&self, context: &Context) -> Result<(), RiskError> {
        self.persist_wallet(&context.sender);
        self.persist_wallet(&context.receiver);
        Ok(())
    }
}
