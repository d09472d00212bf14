//! Chain context: resolves who gets paid for a block.

use std::collections::BTreeMap;

use tessera_primitives::{Address, ChainConfig, Header, ShardId};

use crate::error::ChainError;

/// Read access to chain-level data needed while processing a block.
pub trait ChainContext {
    /// Protocol configuration of the chain.
    fn config(&self) -> &ChainConfig;

    /// Payout address of the leader that committed `header`.
    fn committer_identity(&self, header: &Header) -> Result<Address, ChainError>;
}

/// Static registry mapping a leader's consensus address on a shard to its
/// payout address.
#[derive(Debug, Clone, Default)]
pub struct CommitteeRegistry {
    config: ChainConfig,
    committers: BTreeMap<(ShardId, Address), Address>,
}

impl CommitteeRegistry {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            committers: BTreeMap::new(),
        }
    }

    /// Register `payout` for the leader `coinbase` on `shard_id`.
    pub fn register(&mut self, shard_id: ShardId, coinbase: Address, payout: Address) -> &mut Self {
        self.committers.insert((shard_id, coinbase), payout);
        self
    }

    pub fn len(&self) -> usize {
        self.committers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committers.is_empty()
    }
}

impl ChainContext for CommitteeRegistry {
    fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn committer_identity(&self, header: &Header) -> Result<Address, ChainError> {
        self.committers
            .get(&(header.shard_id, header.coinbase))
            .copied()
            .ok_or(ChainError::UnknownCommitter {
                shard_id: header.shard_id,
                coinbase: header.coinbase,
            })
    }
}
