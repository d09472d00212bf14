//! Core type aliases and constants shared by the primitives and engine crates.
//!
//! Addresses, 256-bit values and log blooms use the `alloy-primitives`
//! representations so that their byte layouts match the wire format
//! (20-byte addresses, 32-byte hashes, 256-byte blooms).

pub use alloy_primitives::{Address, Bloom, B256, U256};

/// 32-byte hash used for block hashes, state roots, and transaction hashes.
pub type Hash = B256;

/// Shard index. Shards are numbered contiguously from zero.
pub type ShardId = u32;

/// Epoch number. Protocol features are switched on per epoch.
pub type Epoch = u64;

/// Block number within a shard chain.
pub type BlockNumber = u64;

/// A zero-valued hash (32 zero bytes).
pub const ZERO_HASH: Hash = B256::ZERO;

/// A zero-valued address (20 zero bytes).
pub const ZERO_ADDRESS: Address = Address::ZERO;

/// Multiply a gas amount by a gas price without overflow.
pub fn gas_fee(gas: u64, gas_price: u64) -> U256 {
    U256::from(gas) * U256::from(gas_price)
}
