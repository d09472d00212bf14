//! Error types for the primitives crate.
//!
//! Each variant carries the values a caller needs to act on the failure,
//! so tests assert on fields rather than on rendered messages.

use crate::types::{Epoch, ShardId};

/// Failure decoding bytes produced by [`crate::codec`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Input ended before a field could be read.
    #[error("unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// Bytes were left over after a complete value was decoded.
    #[error("{0} trailing bytes after decoded value")]
    TrailingBytes(usize),
}

/// The block gas pool cannot cover a requested amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GasPoolError {
    #[error("gas limit reached: {available} available, {requested} requested")]
    Exhausted { available: u64, requested: u64 },
}

/// Sender recovery failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    /// The embedded public key is not a valid Ed25519 point.
    #[error("invalid sender public key")]
    InvalidPublicKey,

    /// The signature does not verify against the signing hash.
    #[error("invalid transaction signature")]
    InvalidSignature,
}

/// Structural problem with a transaction's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransactionError {
    /// Plain transactions must name a destination shard.
    #[error("transaction has no destination shard")]
    MissingDestinationShard,
}

/// Chain configuration failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("shard schedule is empty")]
    EmptySchedule,

    #[error("shard schedule must start at epoch 0, starts at {0}")]
    ScheduleStart(Epoch),

    #[error("shard schedule epochs must strictly increase: {previous} then {next}")]
    UnorderedSchedule { previous: Epoch, next: Epoch },

    #[error("shard schedule entry at epoch {epoch} has {num_shards} shards")]
    InvalidShardCount { epoch: Epoch, num_shards: ShardId },

    #[error("reporter share must be at most 100 percent, got {0}")]
    InvalidReporterShare(u8),

    #[error("malformed config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_pool_error_display() {
        let err = GasPoolError::Exhausted {
            available: 1000,
            requested: 1500,
        };
        let s = err.to_string();
        assert!(s.contains("1000"));
        assert!(s.contains("1500"));
    }

    #[test]
    fn test_codec_error_fields() {
        let err = CodecError::UnexpectedEof {
            needed: 8,
            remaining: 3,
        };
        assert_eq!(
            err,
            CodecError::UnexpectedEof {
                needed: 8,
                remaining: 3
            }
        );
        assert!(err.to_string().contains("needed 8"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnorderedSchedule {
            previous: 10,
            next: 5,
        };
        assert_eq!(
            err.to_string(),
            "shard schedule epochs must strictly increase: 10 then 5"
        );
    }
}
