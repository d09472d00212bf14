//! Shared test helpers for integration tests.
//!
//! Provides deterministic keypairs, signed transaction builders, funded
//! state, headers, and processor factories used across all integration
//! test files.

#![allow(dead_code)]

use ed25519_dalek::SigningKey;
use tessera_engine::{
    CommitteeRegistry, MemStateDb, RewardEngine, StateProcessor, TransferVm,
};
use tessera_primitives::crypto::address_from_public_key;
use tessera_primitives::{
    Account, Address, Block, ChainConfig, CxReceipt, CxReceiptsProof, Epoch, Hash, Header,
    ShardId, Signer, Transaction, U256, ZERO_HASH,
};

/// Consensus address of the block leader on every shard.
pub const LEADER: Address = Address::repeat_byte(0x10);

/// Payout address registered for [`LEADER`].
pub const COMMITTER: Address = Address::repeat_byte(0x11);

/// Default block gas limit.
pub const BLOCK_GAS_LIMIT: u64 = 1_000_000;

/// Starting balance of funded test accounts.
pub const INITIAL_BALANCE: u64 = 10_000_000;

pub type TestProcessor = StateProcessor<CommitteeRegistry, RewardEngine, TransferVm>;

// ── Deterministic Keypairs ──

/// Create a deterministic Ed25519 signing key from a single seed byte.
///
/// The secret key is `[seed; 32]`, giving reproducible keys across machines.
pub fn deterministic_keypair(seed: u8) -> (Address, SigningKey) {
    let signing_key = SigningKey::from_bytes(&[seed; 32]);
    let address = address_from_public_key(signing_key.verifying_key().as_bytes());
    (address, signing_key)
}

/// Alice: seed=1, stable address across all tests.
pub fn alice() -> (Address, SigningKey) {
    deterministic_keypair(1)
}

/// Bob: seed=2, stable address across all tests.
pub fn bob() -> (Address, SigningKey) {
    deterministic_keypair(2)
}

/// Charlie: seed=3, stable address across all tests.
pub fn charlie() -> (Address, SigningKey) {
    deterministic_keypair(3)
}

// ── Configuration ──

/// Four shards, every fork active from epoch 0.
pub fn chain_config() -> ChainConfig {
    ChainConfig::default()
}

/// Cross-shard transactions accepted from `epoch` on.
pub fn config_with_cross_tx_epoch(epoch: Epoch) -> ChainConfig {
    ChainConfig {
        cross_tx_epoch: Some(epoch),
        ..ChainConfig::default()
    }
}

/// Processor whose committee maps [`LEADER`] to [`COMMITTER`] on shards 0..4.
pub fn processor(config: ChainConfig) -> TestProcessor {
    let mut registry = CommitteeRegistry::new(config);
    for shard in 0..4 {
        registry.register(shard, LEADER, COMMITTER);
    }
    StateProcessor::new(registry, RewardEngine::default(), TransferVm::new())
}

// ── State ──

/// State db holding `INITIAL_BALANCE` for each address.
pub fn funded_state(addresses: &[Address]) -> MemStateDb {
    MemStateDb::with_accounts(
        addresses
            .iter()
            .map(|a| (*a, Account::with_balance(U256::from(INITIAL_BALANCE)))),
    )
}

// ── Transactions ──

/// Signed transfer under the signer active at `epoch`.
#[allow(clippy::too_many_arguments)]
pub fn signed_transfer(
    config: &ChainConfig,
    epoch: Epoch,
    key: &SigningKey,
    nonce: u64,
    from_shard: ShardId,
    to_shard: ShardId,
    to: Address,
    value: u64,
) -> Transaction {
    Transaction::transfer(nonce, from_shard, to_shard, to, U256::from(value), 21_000, 1)
        .sign(&Signer::for_epoch(config, epoch), key)
}

// ── Blocks ──

/// Header for `shard_id` at `epoch`, led by [`LEADER`].
pub fn make_header(shard_id: ShardId, epoch: Epoch, number: u64) -> Header {
    Header {
        shard_id,
        epoch,
        number,
        parent_hash: ZERO_HASH,
        state_root: ZERO_HASH,
        timestamp: 1_700_000_000,
        gas_limit: BLOCK_GAS_LIMIT,
        coinbase: LEADER,
        slashes: Vec::new(),
    }
}

pub fn make_block(header: Header, transactions: Vec<Transaction>) -> Block {
    Block::new(header, transactions, Vec::new())
}

/// Incoming receipt crediting `amount` to `to` on `to_shard`.
pub fn incoming_cx(seed: u8, to: Option<Address>, to_shard: ShardId, amount: u64) -> CxReceipt {
    CxReceipt {
        tx_hash: Hash::repeat_byte(seed),
        from: Address::repeat_byte(0xF0),
        to,
        shard_id: 1,
        to_shard_id: to_shard,
        amount: U256::from(amount),
    }
}

/// Proof from source block 5 on shard 1.
pub fn proof(receipts: Vec<CxReceipt>) -> CxReceiptsProof {
    CxReceiptsProof {
        receipts,
        block_number: 5,
        block_hash: Hash::repeat_byte(0x55),
        shard_id: 1,
    }
}
