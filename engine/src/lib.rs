//! `tessera-engine`: deterministic block processing for one shard.
//!
//! This crate implements the per-block state transition:
//! `f(state, block) → (receipts, outgoing cross-shard receipts, logs, gas_used, payout)`
//!
//! It classifies each transaction by its shard relationship, runs it
//! through a VM against a state db, credits proven incoming cross-shard
//! receipts and finalizes rewards and slashing through a consensus engine.
//!
//! ## Architecture
//!
//! - [`state::StateDb`]: world-state interface; [`state::MemStateDb`] in memory
//! - [`vm::Vm`]: message execution; [`vm::TransferVm`] native value transfers
//! - [`chain::ChainContext`]: committer identity; [`chain::CommitteeRegistry`]
//! - [`consensus::ConsensusEngine`]: finalization; [`consensus::RewardEngine`]
//! - [`classifier`]: same-shard / cross-shard / staking / invalid
//! - [`executor`]: single-transaction application
//! - [`incoming`]: crediting incoming cross-shard receipts
//! - [`processor::StateProcessor`]: top-level block entry point

pub mod error;
pub mod state;
pub mod chain;
pub mod vm;
pub mod classifier;
pub mod executor;
pub mod incoming;
pub mod consensus;
pub mod processor;

// Re-export key types for convenience
pub use error::{ChainError, FinalizeError, ProcessError, VmError};
pub use state::{MemStateDb, StateDb};
pub use chain::{ChainContext, CommitteeRegistry};
pub use vm::{ExecutionOutcome, TransferVm, Vm, VmConfig, VmContext};
pub use classifier::classify_transaction;
pub use executor::{apply_transaction, AppliedTransaction};
pub use incoming::apply_incoming_receipt;
pub use consensus::{ConsensusEngine, FinalizedBlock, RewardConfig, RewardEngine, RewardPayout};
pub use processor::{ProcessOutput, StateProcessor};
