//! Receipts, logs, blooms, and cross-shard receipts.

use alloy_primitives::BloomInput;

use crate::types::{Address, BlockNumber, Bloom, Hash, ShardId, U256};

/// Outcome status recorded in a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReceiptStatus {
    Failed = 0,
    Successful = 1,
}

impl ReceiptStatus {
    /// Returns true if the transaction executed successfully.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Successful)
    }
}

/// Log entry emitted during execution.
///
/// The position fields are stamped by the state db from the context set
/// with `prepare` before each transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics.
    pub topics: Vec<Hash>,
    /// Unindexed payload.
    pub data: Vec<u8>,
    pub block_number: BlockNumber,
    pub block_hash: Hash,
    pub tx_hash: Hash,
    /// Index of the transaction in the block.
    pub tx_index: u32,
    /// Index of the log in the block.
    pub index: u32,
}

impl Log {
    /// Log with no position information yet.
    pub fn new(address: Address, topics: Vec<Hash>, data: Vec<u8>) -> Self {
        Self {
            address,
            topics,
            data,
            block_number: 0,
            block_hash: Hash::ZERO,
            tx_hash: Hash::ZERO,
            tx_index: 0,
            index: 0,
        }
    }
}

/// Per-transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Intermediate state root; empty once per-transaction roots are gone.
    pub post_state: Vec<u8>,
    pub status: ReceiptStatus,
    /// Gas used by this and every earlier transaction of the block.
    pub cumulative_gas_used: u64,
    /// Gas used by this transaction.
    pub gas_used: u64,
    pub tx_hash: Hash,
    /// Address of the deployed contract, for creations.
    pub contract_address: Option<Address>,
    pub logs: Vec<Log>,
    pub bloom: Bloom,
}

impl Receipt {
    /// Create a receipt with the given root, failure flag and cumulative gas.
    pub fn new(post_state: Vec<u8>, failed: bool, cumulative_gas_used: u64) -> Self {
        Self {
            post_state,
            status: if failed {
                ReceiptStatus::Failed
            } else {
                ReceiptStatus::Successful
            },
            cumulative_gas_used,
            gas_used: 0,
            tx_hash: Hash::ZERO,
            contract_address: None,
            logs: Vec::new(),
            bloom: Bloom::ZERO,
        }
    }
}

/// Bloom over the addresses and topics of `logs`.
pub fn logs_bloom(logs: &[Log]) -> Bloom {
    let mut bloom = Bloom::ZERO;
    for log in logs {
        bloom.accrue(BloomInput::Raw(log.address.as_slice()));
        for topic in &log.topics {
            bloom.accrue(BloomInput::Raw(topic.as_slice()));
        }
    }
    bloom
}

/// Bloom over the logs of every receipt in `receipts`.
pub fn create_bloom(receipts: &[Receipt]) -> Bloom {
    let mut bloom = Bloom::ZERO;
    for receipt in receipts {
        bloom.accrue_bloom(&logs_bloom(&receipt.logs));
    }
    bloom
}

/// Outgoing cross-shard receipt: the credit instruction for the
/// destination shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CxReceipt {
    pub tx_hash: Hash,
    pub from: Address,
    /// Recipient on the destination shard; a receipt without one is invalid.
    pub to: Option<Address>,
    pub shard_id: ShardId,
    pub to_shard_id: ShardId,
    pub amount: U256,
}

/// Batch of cross-shard receipts from one source block, proven valid by
/// the caller before it reaches block processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CxReceiptsProof {
    pub receipts: Vec<CxReceipt>,
    /// Source block number.
    pub block_number: BlockNumber,
    /// Source block hash.
    pub block_hash: Hash,
    /// Source shard.
    pub shard_id: ShardId,
}

impl CxReceiptsProof {
    /// Sum of the amounts carried by the batch.
    pub fn total_amount(&self) -> U256 {
        self.receipts
            .iter()
            .fold(U256::ZERO, |acc, cx| acc.saturating_add(cx.amount))
    }
}
