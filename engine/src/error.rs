//! Error types for block processing.
//!
//! [`ProcessError`] is the single block-level error: any variant aborts the
//! block and no partial output is returned. A transaction that merely fails
//! execution is not an error; it yields a receipt with failed status.

use tessera_primitives::{Address, CodecError, Epoch, Hash, ShardId, SignerError, U256};

/// Unrecoverable fault raised by the virtual machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    #[error("nonce mismatch for {address}: state has {expected}, transaction has {got}")]
    NonceMismatch {
        address: Address,
        expected: u64,
        got: u64,
    },

    #[error("insufficient balance for gas: {address} has {balance}, needs {required}")]
    InsufficientBalanceForGas {
        address: Address,
        balance: U256,
        required: U256,
    },

    #[error("nonce of {address} cannot be incremented past {nonce}")]
    NonceOverflow { address: Address, nonce: u64 },

    #[error("block gas limit reached: {available} available, {requested} requested")]
    GasLimitReached { available: u64, requested: u64 },

    #[error("intrinsic gas too low: limit {gas_limit}, intrinsic {intrinsic}")]
    IntrinsicGas { gas_limit: u64, intrinsic: u64 },

    #[error("invalid transactions cannot be executed")]
    InvalidCategory,
}

/// Committer identity could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("no committer registered for coinbase {coinbase} on shard {shard_id}")]
    UnknownCommitter { shard_id: ShardId, coinbase: Address },
}

/// Consensus finalization rejected the block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FinalizeError {
    #[error("slash record for {offender} is from future epoch {record_epoch} (block epoch {block_epoch})")]
    FutureSlashRecord {
        offender: Address,
        record_epoch: Epoch,
        block_epoch: Epoch,
    },

    #[error("offender {offender} is slashed more than once in the same block")]
    DuplicateOffender { offender: Address },

    #[error("slash evidence for {offender} does not contain two distinct votes")]
    InvalidEvidence { offender: Address },

    #[error("cannot resolve block reward recipient: {0}")]
    Committer(#[from] ChainError),
}

/// Block processing failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessError {
    #[error("invalid transaction type for transaction {tx_hash}")]
    InvalidTransactionType { tx_hash: Hash },

    #[error("cross-shard transactions not accepted yet: cross-shard epoch {cross_tx_epoch:?}, current epoch {current_epoch}")]
    CrossShardNotYetEnabled {
        cross_tx_epoch: Option<Epoch>,
        current_epoch: Epoch,
    },

    #[error("sender recovery failed: {0}")]
    Signature(#[from] SignerError),

    #[error("virtual machine fault: {0}")]
    Vm(#[from] VmError),

    #[error("incoming receipt {index} of transaction {tx_hash} has no recipient")]
    InvalidIncomingReceipt { index: usize, tx_hash: Hash },

    #[error("cannot decode slash records: {0}")]
    SlashRecordDecode(#[source] CodecError),

    #[error("cannot finalize block: {0}")]
    Finalize(#[from] FinalizeError),

    #[error("cannot resolve committer identity: {0}")]
    CommitterIdentity(#[from] ChainError),
}
