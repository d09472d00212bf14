//! Chain configuration: fork epochs and the shard schedule.
//!
//! Every protocol-version decision made during block processing is a
//! predicate over the header's epoch. A fork epoch of `None` means the
//! feature is never enabled.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Epoch, ShardId};

/// Protocol configuration consumed by the block processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Chain identifier bound into signatures after `eip155_epoch`.
    pub chain_id: u64,
    /// First epoch accepting cross-shard transactions.
    pub cross_tx_epoch: Option<Epoch>,
    /// First epoch whose signatures commit to the chain id.
    pub eip155_epoch: Option<Epoch>,
    /// First epoch of the S3 state model (no per-transaction roots).
    pub s3_epoch: Option<Epoch>,
    /// First epoch retaining logs in receipts.
    pub receipt_log_epoch: Option<Epoch>,
    /// Number of shards per epoch range.
    pub shard_schedule: ShardSchedule,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            cross_tx_epoch: Some(0),
            eip155_epoch: Some(0),
            s3_epoch: Some(0),
            receipt_log_epoch: Some(0),
            shard_schedule: ShardSchedule::fixed(4),
        }
    }
}

fn is_forked(fork: Option<Epoch>, epoch: Epoch) -> bool {
    matches!(fork, Some(f) if f <= epoch)
}

impl ChainConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shard_schedule.validate()
    }

    /// Whether cross-shard transactions are accepted at `epoch`.
    pub fn accepts_cross_tx(&self, epoch: Epoch) -> bool {
        is_forked(self.cross_tx_epoch, epoch)
    }

    /// Whether signatures commit to the chain id at `epoch`.
    pub fn is_eip155(&self, epoch: Epoch) -> bool {
        is_forked(self.eip155_epoch, epoch)
    }

    /// Whether the S3 state model is active at `epoch`.
    pub fn is_s3(&self, epoch: Epoch) -> bool {
        is_forked(self.s3_epoch, epoch)
    }

    /// Whether receipts keep their logs at `epoch`.
    pub fn is_receipt_log(&self, epoch: Epoch) -> bool {
        is_forked(self.receipt_log_epoch, epoch)
    }
}

/// One entry of the shard schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardingEpoch {
    /// First epoch this entry applies to.
    pub from_epoch: Epoch,
    /// Number of shards, numbered `0..num_shards`.
    pub num_shards: ShardId,
}

/// Shard counts over time, sorted by `from_epoch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardSchedule {
    entries: Vec<ShardingEpoch>,
}

impl ShardSchedule {
    /// A schedule with the same shard count at every epoch.
    pub fn fixed(num_shards: ShardId) -> Self {
        Self {
            entries: vec![ShardingEpoch {
                from_epoch: 0,
                num_shards,
            }],
        }
    }

    /// Build a schedule from explicit entries, validating their order.
    pub fn new(entries: Vec<ShardingEpoch>) -> Result<Self, ConfigError> {
        let schedule = Self { entries };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Number of shards active at `epoch`.
    pub fn num_shards(&self, epoch: Epoch) -> ShardId {
        self.entries
            .iter()
            .rev()
            .find(|e| e.from_epoch <= epoch)
            .map(|e| e.num_shards)
            .unwrap_or(0)
    }

    /// Returns the schedule entries.
    pub fn entries(&self) -> &[ShardingEpoch] {
        &self.entries
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let first = self.entries.first().ok_or(ConfigError::EmptySchedule)?;
        if first.from_epoch != 0 {
            return Err(ConfigError::ScheduleStart(first.from_epoch));
        }
        for entry in &self.entries {
            if entry.num_shards == 0 {
                return Err(ConfigError::InvalidShardCount {
                    epoch: entry.from_epoch,
                    num_shards: entry.num_shards,
                });
            }
        }
        for pair in self.entries.windows(2) {
            if pair[1].from_epoch <= pair[0].from_epoch {
                return Err(ConfigError::UnorderedSchedule {
                    previous: pair[0].from_epoch,
                    next: pair[1].from_epoch,
                });
            }
        }
        Ok(())
    }
}

impl Default for ShardSchedule {
    fn default() -> Self {
        Self::fixed(4)
    }
}
