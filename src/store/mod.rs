//! Bundled collaborator implementations
//!
//! - [`memory`] - In-memory DashMap-backed risk lookup and score store

pub mod memory;

pub use memory::{MemoryRiskLookup, MemoryScoreStore, WalletRecord};
