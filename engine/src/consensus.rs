//! Block finalization: rewards, slashing, and the final state root.
//!
//! The block processor hands everything a block produced to a
//! [`ConsensusEngine`] injected at construction. [`RewardEngine`] pays a
//! fixed block reward to the committer and slashes double signers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tessera_primitives::receipt::create_bloom;
use tessera_primitives::{
    Address, Bloom, ConfigError, CxReceipt, CxReceiptsProof, Header, Receipt, SlashRecords,
    Transaction, U256,
};

use crate::chain::ChainContext;
use crate::error::FinalizeError;
use crate::state::StateDb;

/// Header and summary of a finalized block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedBlock {
    /// Input header with the final state root filled in.
    pub header: Header,
    /// Bloom over the logs of every receipt.
    pub logs_bloom: Bloom,
    /// Gas used by all transactions.
    pub gas_used: u64,
    pub tx_count: usize,
    pub outgoing_count: usize,
    pub incoming_count: usize,
}

/// Rewards paid and penalties applied while finalizing a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardPayout {
    /// Recipient of the block reward.
    pub committer: Address,
    pub block_reward: U256,
    /// Total taken from offenders.
    pub slashed: U256,
    /// Part of `slashed` paid to reporters.
    pub reporter_rewards: U256,
    /// Part of `slashed` destroyed.
    pub burned: U256,
}

/// Consensus-variant finalization step.
pub trait ConsensusEngine {
    /// Apply rewards and slashing to `state`, then compute the final root.
    #[allow(clippy::too_many_arguments)]
    fn finalize(
        &self,
        chain: &dyn ChainContext,
        header: &Header,
        state: &mut dyn StateDb,
        transactions: &[Transaction],
        receipts: &[Receipt],
        outgoing: &[CxReceipt],
        incoming: &[CxReceiptsProof],
        slashes: &SlashRecords,
    ) -> Result<(FinalizedBlock, RewardPayout), FinalizeError>;
}

/// Reward and slashing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Minted to the committer for every block.
    pub block_reward: U256,
    /// Taken from each offender, capped at its balance.
    pub slash_amount: U256,
    /// Percentage of each slash paid to the reporter; the rest is burned.
    pub reporter_share_percent: u8,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            block_reward: U256::from(1_000_000u64),
            slash_amount: U256::from(500_000u64),
            reporter_share_percent: 50,
        }
    }
}

impl RewardConfig {
    /// Parse from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reporter_share_percent > 100 {
            return Err(ConfigError::InvalidReporterShare(self.reporter_share_percent));
        }
        Ok(())
    }
}

/// Fixed-reward consensus engine.
#[derive(Debug, Clone, Default)]
pub struct RewardEngine {
    config: RewardConfig,
}

impl RewardEngine {
    pub fn new(config: RewardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    /// Reject the whole set before any balance is touched.
    fn check_slashes(header: &Header, slashes: &SlashRecords) -> Result<(), FinalizeError> {
        let mut seen = BTreeSet::new();
        for record in slashes {
            if record.moment.epoch > header.epoch {
                return Err(FinalizeError::FutureSlashRecord {
                    offender: record.offender,
                    record_epoch: record.moment.epoch,
                    block_epoch: header.epoch,
                });
            }
            if !record.evidence.is_conflicting() {
                return Err(FinalizeError::InvalidEvidence {
                    offender: record.offender,
                });
            }
            if !seen.insert(record.offender) {
                return Err(FinalizeError::DuplicateOffender {
                    offender: record.offender,
                });
            }
        }
        Ok(())
    }
}

impl ConsensusEngine for RewardEngine {
    fn finalize(
        &self,
        chain: &dyn ChainContext,
        header: &Header,
        state: &mut dyn StateDb,
        transactions: &[Transaction],
        receipts: &[Receipt],
        outgoing: &[CxReceipt],
        incoming: &[CxReceiptsProof],
        slashes: &SlashRecords,
    ) -> Result<(FinalizedBlock, RewardPayout), FinalizeError> {
        let committer = chain.committer_identity(header)?;
        Self::check_slashes(header, slashes)?;

        let mut payout = RewardPayout {
            committer,
            block_reward: self.config.block_reward,
            ..RewardPayout::default()
        };
        state.add_balance(committer, self.config.block_reward);

        let share = U256::from(self.config.reporter_share_percent.min(100));
        for record in slashes {
            let amount = self.config.slash_amount.min(state.balance(&record.offender));
            state.sub_balance(record.offender, amount);
            let reward = amount * share / U256::from(100u64);
            state.add_balance(record.reporter, reward);

            payout.slashed += amount;
            payout.reporter_rewards += reward;
            payout.burned += amount - reward;
            tracing::info!(
                offender = %record.offender,
                reporter = %record.reporter,
                epoch = record.moment.epoch,
                slashed = %amount,
                reporter_reward = %reward,
                "slashed double signer"
            );
        }

        let mut finalized = header.clone();
        finalized.state_root = state.intermediate_root(chain.config().is_s3(header.epoch));

        let block = FinalizedBlock {
            header: finalized,
            logs_bloom: create_bloom(receipts),
            gas_used: receipts.last().map_or(0, |r| r.cumulative_gas_used),
            tx_count: transactions.len(),
            outgoing_count: outgoing.len(),
            incoming_count: incoming.iter().map(|p| p.receipts.len()).sum(),
        };
        Ok((block, payout))
    }
}
