//! Block and header types.
//!
//! A block is the unit of atomic state transition: its transactions are
//! applied in order, then its incoming cross-shard receipts, then the
//! consensus engine finalizes rewards and slashing.

use crate::codec::encode_header;
use crate::crypto::hash_sha256;
use crate::receipt::CxReceiptsProof;
use crate::transaction::Transaction;
use crate::types::{Address, BlockNumber, Epoch, Hash, ShardId};

/// Block header.
///
/// The block hash is SHA-256 over the canonical encoding of this header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Shard this block belongs to.
    pub shard_id: ShardId,
    /// Epoch the block was proposed in.
    pub epoch: Epoch,
    /// Block number within the shard chain.
    pub number: BlockNumber,
    /// Hash of the parent block's header.
    pub parent_hash: Hash,
    /// State root after executing this block.
    pub state_root: Hash,
    /// Logical time from the consensus header.
    pub timestamp: u64,
    /// Maximum gas the block's transactions may consume together.
    pub gas_limit: u64,
    /// Consensus address of the block leader.
    pub coinbase: Address,
    /// Encoded slash records; empty when the block carries none.
    pub slashes: Vec<u8>,
}

impl Header {
    /// Compute the header hash.
    pub fn hash(&self) -> Hash {
        hash_sha256(&encode_header(self))
    }

    /// Returns true if the header carries slash records.
    pub fn has_slashes(&self) -> bool {
        !self.slashes.is_empty()
    }
}

/// Full block with ordered transactions and incoming receipts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block header.
    pub header: Header,
    /// Ordered transactions.
    pub transactions: Vec<Transaction>,
    /// Proven cross-shard receipts credited by this block.
    pub incoming_receipts: Vec<CxReceiptsProof>,
}

impl Block {
    /// Assemble a block.
    pub fn new(
        header: Header,
        transactions: Vec<Transaction>,
        incoming_receipts: Vec<CxReceiptsProof>,
    ) -> Self {
        Self {
            header,
            transactions,
            incoming_receipts,
        }
    }

    /// Hash of the block's header.
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Returns the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Returns true if this block has no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Gas limit from the header.
    pub fn gas_limit(&self) -> u64 {
        self.header.gas_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ZERO_ADDRESS, ZERO_HASH};

    fn sample_header() -> Header {
        Header {
            shard_id: 0,
            epoch: 1,
            number: 10,
            parent_hash: ZERO_HASH,
            state_root: ZERO_HASH,
            timestamp: 1_700_000_000,
            gas_limit: 10_000_000,
            coinbase: ZERO_ADDRESS,
            slashes: Vec::new(),
        }
    }

    #[test]
    fn test_header_hash_deterministic() {
        assert_eq!(sample_header().hash(), sample_header().hash());
    }

    #[test]
    fn test_header_hash_covers_fields() {
        let base = sample_header().hash();

        let mut other = sample_header();
        other.shard_id = 1;
        assert_ne!(other.hash(), base);

        let mut other = sample_header();
        other.slashes = vec![1];
        assert_ne!(other.hash(), base);

        let mut other = sample_header();
        other.state_root = Hash::repeat_byte(9);
        assert_ne!(other.hash(), base);
    }

    #[test]
    fn test_empty_block() {
        let block = Block::new(sample_header(), vec![], vec![]);
        assert_eq!(block.tx_count(), 0);
        assert!(block.is_empty());
        assert_eq!(block.gas_limit(), 10_000_000);
        assert_eq!(block.hash(), sample_header().hash());
        assert!(!block.header.has_slashes());
    }
}
