//! Double-signing evidence carried in block headers.

use crate::codec;
use crate::error::CodecError;
use crate::types::{Address, Epoch, Hash, ShardId};

/// When and where an offence happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub epoch: Epoch,
    pub shard_id: ShardId,
}

/// Two distinct votes signed by the same key for the same height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictingVotes {
    pub first_vote: Hash,
    pub second_vote: Hash,
}

impl ConflictingVotes {
    /// Identical votes are not a conflict.
    pub fn is_conflicting(&self) -> bool {
        self.first_vote != self.second_vote
    }
}

/// A single slashing offence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashRecord {
    pub offender: Address,
    pub reporter: Address,
    pub moment: Moment,
    pub evidence: ConflictingVotes,
}

/// Ordered slash records from one header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlashRecords(Vec<SlashRecord>);

impl SlashRecords {
    pub fn new(records: Vec<SlashRecord>) -> Self {
        Self(records)
    }

    /// Decode the header's slash payload. An empty payload means no records.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        if data.is_empty() {
            return Ok(Self::default());
        }
        codec::decode_slash_records(data)
    }

    /// Encode for embedding in a header.
    pub fn encode(&self) -> Vec<u8> {
        codec::encode_slash_records(self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SlashRecord> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a SlashRecords {
    type Item = &'a SlashRecord;
    type IntoIter = std::slice::Iter<'a, SlashRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
