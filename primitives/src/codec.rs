//! Deterministic binary encoding for hashed and transported structures.
//!
//! Encoding format:
//! - Fixed-size fields (hash, address, u64, u32) are written directly,
//!   integers little-endian
//! - `U256` values are written as 32 big-endian bytes
//! - Variable-length fields (`Vec<u8>`) are length-prefixed (u32 LE)
//! - Repeated fields are count-prefixed (u32 LE) then concatenated
//! - Optional fields: 1-byte flag (0 = None, 1 = Some) then the value
//!
//! Header and transaction encodings feed hashes and signatures, account
//! encodings feed the state root, and slash records travel inside headers.

use crate::block::Header;
use crate::error::CodecError;
use crate::slash::{ConflictingVotes, Moment, SlashRecord, SlashRecords};
use crate::state::Account;
use crate::transaction::{Transaction, TxKind};
use crate::types::{Address, Hash, U256};

/// A cursor for reading bytes during decoding.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_u64(&mut self) -> Result<u64, CodecError> {
        let bytes = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    fn read_hash(&mut self) -> Result<Hash, CodecError> {
        Ok(Hash::from_slice(self.read_bytes(32)?))
    }

    fn read_address(&mut self) -> Result<Address, CodecError> {
        Ok(Address::from_slice(self.read_bytes(20)?))
    }

    /// Fail if any bytes remain unread.
    fn finish(&self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

// ── Encoding helpers ──

fn write_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_hash(buf: &mut Vec<u8>, h: &Hash) {
    buf.extend_from_slice(h.as_slice());
}

fn write_address(buf: &mut Vec<u8>, a: &Address) {
    buf.extend_from_slice(a.as_slice());
}

fn write_optional_u32(buf: &mut Vec<u8>, v: Option<u32>) {
    match v {
        None => buf.push(0),
        Some(v) => {
            buf.push(1);
            write_u32(buf, v);
        }
    }
}

fn write_u256(buf: &mut Vec<u8>, v: &U256) {
    buf.extend_from_slice(&v.to_be_bytes::<32>());
}

fn write_var_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    write_u32(buf, data.len() as u32);
    buf.extend_from_slice(data);
}

// ── Header encoding ──

/// Encode a `Header` to deterministic bytes.
pub fn encode_header(header: &Header) -> Vec<u8> {
    let mut buf = Vec::with_capacity(160 + header.slashes.len());
    write_u32(&mut buf, header.shard_id);
    write_u64(&mut buf, header.epoch);
    write_u64(&mut buf, header.number);
    write_hash(&mut buf, &header.parent_hash);
    write_hash(&mut buf, &header.state_root);
    write_u64(&mut buf, header.timestamp);
    write_u64(&mut buf, header.gas_limit);
    write_address(&mut buf, &header.coinbase);
    write_var_bytes(&mut buf, &header.slashes);
    buf
}

// ── Transaction encoding ──

const KIND_CALL: u8 = 0;
const KIND_CREATE: u8 = 1;
const KIND_STAKING: u8 = 2;

fn encode_tx_kind(buf: &mut Vec<u8>, kind: &TxKind) {
    match kind {
        TxKind::Call(to) => {
            write_u8(buf, KIND_CALL);
            write_address(buf, to);
        }
        TxKind::Create => write_u8(buf, KIND_CREATE),
        TxKind::Staking(staking) => {
            write_u8(buf, KIND_STAKING);
            write_u8(buf, *staking as u8);
        }
    }
}

/// Encode the signed portion of a transaction (everything but the key and
/// signature).
pub fn encode_unsigned_transaction(tx: &Transaction) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + tx.data.len());
    write_u64(&mut buf, tx.nonce);
    write_u64(&mut buf, tx.gas_price);
    write_u64(&mut buf, tx.gas_limit);
    write_u32(&mut buf, tx.shard_id);
    write_optional_u32(&mut buf, tx.to_shard_id);
    encode_tx_kind(&mut buf, &tx.kind);
    write_u256(&mut buf, &tx.value);
    write_var_bytes(&mut buf, &tx.data);
    buf
}

/// Encode a full transaction including its public key and signature.
pub fn encode_transaction(tx: &Transaction) -> Vec<u8> {
    let mut buf = encode_unsigned_transaction(tx);
    buf.extend_from_slice(&tx.public_key);
    buf.extend_from_slice(&tx.signature);
    buf
}

// ── Account encoding ──

/// Encode an account as a state-trie leaf value.
pub fn encode_account(account: &Account) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + 32 + 4 + account.code.len());
    write_u64(&mut buf, account.nonce);
    write_u256(&mut buf, &account.balance);
    write_var_bytes(&mut buf, &account.code);
    buf
}

// ── Slash record encoding ──

/// Encode slash records for embedding in a header.
pub fn encode_slash_records(records: &SlashRecords) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + records.len() * 128);
    write_u32(&mut buf, records.len() as u32);
    for record in records.iter() {
        write_address(&mut buf, &record.offender);
        write_address(&mut buf, &record.reporter);
        write_u64(&mut buf, record.moment.epoch);
        write_u32(&mut buf, record.moment.shard_id);
        write_hash(&mut buf, &record.evidence.first_vote);
        write_hash(&mut buf, &record.evidence.second_vote);
    }
    buf
}

/// Decode slash records carried in a header.
///
/// The input must hold exactly one record list with no trailing bytes.
pub fn decode_slash_records(data: &[u8]) -> Result<SlashRecords, CodecError> {
    let mut r = Reader::new(data);
    let count = r.read_u32()? as usize;
    // Each record is at least 124 bytes; bound the allocation by the input.
    let mut records = Vec::with_capacity(count.min(r.remaining() / 124));
    for _ in 0..count {
        let offender = r.read_address()?;
        let reporter = r.read_address()?;
        let epoch = r.read_u64()?;
        let shard_id = r.read_u32()?;
        let first_vote = r.read_hash()?;
        let second_vote = r.read_hash()?;
        records.push(SlashRecord {
            offender,
            reporter,
            moment: Moment { epoch, shard_id },
            evidence: ConflictingVotes {
                first_vote,
                second_vote,
            },
        });
    }
    r.finish()?;
    Ok(SlashRecords::new(records))
}
