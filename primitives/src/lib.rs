//! `tessera-primitives`: foundational types for the Tessera shard chain.
//!
//! This crate provides the canonical block, transaction, receipt and
//! account types, chain configuration, gas accounting, cryptography, the
//! account state root, and the deterministic encoding shared by the
//! block-processing engine.

pub mod types;
pub mod error;
pub mod gas;
pub mod config;
pub mod crypto;
pub mod codec;
pub mod block;
pub mod transaction;
pub mod receipt;
pub mod slash;
pub mod state;
pub mod merkle;

// Re-export commonly used types at the crate root for convenience.
pub use types::{Address, BlockNumber, Bloom, Epoch, Hash, ShardId, U256, ZERO_ADDRESS, ZERO_HASH};
pub use error::{CodecError, ConfigError, GasPoolError, SignerError, TransactionError};
pub use gas::GasPool;
pub use config::{ChainConfig, ShardSchedule, ShardingEpoch};
pub use block::{Block, Header};
pub use transaction::{Message, Signer, StakingKind, Transaction, TxCategory, TxKind};
pub use receipt::{CxReceipt, CxReceiptsProof, Log, Receipt, ReceiptStatus};
pub use slash::{ConflictingVotes, Moment, SlashRecord, SlashRecords};
pub use state::{Account, AccountOverlay, OverlayResult};
pub use merkle::AccountTrie;
