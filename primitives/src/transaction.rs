//! Transactions, their shard-relationship categories, and sender recovery.
//!
//! A transaction names the shard it debits (`shard_id`) and, unless it is a
//! staking transaction, the shard it credits (`to_shard_id`). Senders are
//! recovered by verifying the Ed25519 signature over the signing hash; the
//! signing hash commits to the chain id once replay protection is active.

use crate::codec::{encode_transaction, encode_unsigned_transaction};
use crate::config::ChainConfig;
use crate::crypto::{
    address_from_public_key, hash_sha256, is_valid_public_key, sign_ed25519, verify_ed25519,
};
use crate::error::{SignerError, TransactionError};
use crate::types::{Address, BlockNumber, Epoch, Hash, ShardId, U256};

/// Staking directive carried by a staking transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StakingKind {
    CreateValidator = 0,
    EditValidator = 1,
    Delegate = 2,
    Undelegate = 3,
    CollectRewards = 4,
}

/// What a transaction does once it reaches its origin shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    /// Transfer value to, or call, an existing address.
    Call(Address),
    /// Deploy `data` as code at an address derived from sender and nonce.
    Create,
    /// Staking directive; never cross-shard.
    Staking(StakingKind),
}

/// Shard-relationship category assigned to a transaction for one block.
///
/// The category, not the transaction's static shape, decides whether an
/// outgoing cross-shard receipt is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxCategory {
    /// Debit and credit happen on this shard.
    SameShard,
    /// Debit happens here; the credit is settled on the destination shard.
    SubtractionOnly,
    /// Staking directive.
    Staking(StakingKind),
    /// The transaction cannot be processed on this shard.
    Invalid,
}

impl TxCategory {
    /// Returns true for the cross-shard debit leg.
    pub fn is_cross_shard(self) -> bool {
        matches!(self, Self::SubtractionOnly)
    }
}

/// A signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Sender account nonce.
    pub nonce: u64,
    /// Price paid per unit of gas.
    pub gas_price: u64,
    /// Maximum gas this transaction may consume.
    pub gas_limit: u64,
    /// Origin shard.
    pub shard_id: ShardId,
    /// Destination shard; absent for staking transactions.
    pub to_shard_id: Option<ShardId>,
    /// Action performed.
    pub kind: TxKind,
    /// Value moved from the sender.
    pub value: U256,
    /// Call data, init code, or staking payload.
    pub data: Vec<u8>,
    /// Sender's Ed25519 public key.
    pub public_key: [u8; 32],
    /// Ed25519 signature over the signing hash.
    pub signature: [u8; 64],
}

impl Transaction {
    /// Unsigned value transfer from `shard_id` to `to` on `to_shard_id`.
    pub fn transfer(
        nonce: u64,
        shard_id: ShardId,
        to_shard_id: ShardId,
        to: Address,
        value: U256,
        gas_limit: u64,
        gas_price: u64,
    ) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            shard_id,
            to_shard_id: Some(to_shard_id),
            kind: TxKind::Call(to),
            value,
            data: Vec::new(),
            public_key: [0u8; 32],
            signature: [0u8; 64],
        }
    }

    /// Unsigned contract deployment on `shard_id`.
    pub fn create(
        nonce: u64,
        shard_id: ShardId,
        code: Vec<u8>,
        value: U256,
        gas_limit: u64,
        gas_price: u64,
    ) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            shard_id,
            to_shard_id: Some(shard_id),
            kind: TxKind::Create,
            value,
            data: code,
            public_key: [0u8; 32],
            signature: [0u8; 64],
        }
    }

    /// Unsigned staking directive on `shard_id`.
    pub fn staking(
        nonce: u64,
        shard_id: ShardId,
        kind: StakingKind,
        payload: Vec<u8>,
        gas_limit: u64,
        gas_price: u64,
    ) -> Self {
        Self {
            nonce,
            gas_price,
            gas_limit,
            shard_id,
            to_shard_id: None,
            kind: TxKind::Staking(kind),
            value: U256::ZERO,
            data: payload,
            public_key: [0u8; 32],
            signature: [0u8; 64],
        }
    }

    /// Attach call data.
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Sign with `signing_key` under `signer`, filling key and signature.
    pub fn sign(mut self, signer: &Signer, signing_key: &ed25519_dalek::SigningKey) -> Self {
        self.public_key = signing_key.verifying_key().to_bytes();
        let hash = signer.signing_hash(&self);
        self.signature = sign_ed25519(hash.as_slice(), signing_key);
        self
    }

    /// Hash over every field, signature included.
    pub fn hash(&self) -> Hash {
        hash_sha256(&encode_transaction(self))
    }

    /// Returns true for staking transactions.
    pub fn is_staking(&self) -> bool {
        matches!(self.kind, TxKind::Staking(_))
    }

    /// Staking directive, if any.
    pub fn staking_kind(&self) -> Option<StakingKind> {
        match self.kind {
            TxKind::Staking(kind) => Some(kind),
            _ => None,
        }
    }

    /// Returns true for contract deployments.
    pub fn is_creation(&self) -> bool {
        matches!(self.kind, TxKind::Create)
    }

    /// Recipient address; `None` for deployments and staking.
    pub fn to(&self) -> Option<Address> {
        match self.kind {
            TxKind::Call(to) => Some(to),
            _ => None,
        }
    }

    /// Origin shard.
    pub fn shard_id(&self) -> ShardId {
        self.shard_id
    }

    /// Destination shard.
    pub fn to_shard_id(&self) -> Result<ShardId, TransactionError> {
        self.to_shard_id
            .ok_or(TransactionError::MissingDestinationShard)
    }

    /// Recover the executable message using `signer`.
    pub fn as_message(&self, signer: &Signer) -> Result<Message, SignerError> {
        let from = signer.sender(self)?;
        Ok(Message {
            from,
            to: self.to(),
            nonce: self.nonce,
            value: self.value,
            gas_limit: self.gas_limit,
            gas_price: self.gas_price,
            data: self.data.clone(),
            block_number: 0,
        })
    }
}

/// Executable view of a transaction with its recovered sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: Address,
    pub to: Option<Address>,
    pub nonce: u64,
    pub value: U256,
    pub gas_limit: u64,
    pub gas_price: u64,
    pub data: Vec<u8>,
    /// Number of the block the message executes in.
    pub block_number: BlockNumber,
}

impl Message {
    /// Stamp the containing block number.
    pub fn with_block_number(mut self, number: BlockNumber) -> Self {
        self.block_number = number;
        self
    }

    /// Returns true if the message deploys a contract.
    pub fn is_creation(&self) -> bool {
        self.to.is_none()
    }
}

/// Signature scheme active at an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signer {
    /// Signing hash covers the transaction fields only.
    Legacy,
    /// Signing hash also commits to the chain id.
    Eip155 { chain_id: u64 },
}

impl Signer {
    /// Select the signer for `epoch`.
    pub fn for_epoch(config: &ChainConfig, epoch: Epoch) -> Self {
        if config.is_eip155(epoch) {
            Self::Eip155 {
                chain_id: config.chain_id,
            }
        } else {
            Self::Legacy
        }
    }

    /// Hash the signature is computed over.
    pub fn signing_hash(&self, tx: &Transaction) -> Hash {
        let mut payload = encode_unsigned_transaction(tx);
        if let Self::Eip155 { chain_id } = self {
            payload.extend_from_slice(&chain_id.to_le_bytes());
        }
        hash_sha256(&payload)
    }

    /// Verify the signature and derive the sender address.
    pub fn sender(&self, tx: &Transaction) -> Result<Address, SignerError> {
        if !is_valid_public_key(&tx.public_key) {
            return Err(SignerError::InvalidPublicKey);
        }
        let hash = self.signing_hash(tx);
        if !verify_ed25519(hash.as_slice(), &tx.signature, &tx.public_key) {
            return Err(SignerError::InvalidSignature);
        }
        Ok(address_from_public_key(&tx.public_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(seed: u8) -> ed25519_dalek::SigningKey {
        ed25519_dalek::SigningKey::from_bytes(&[seed; 32])
    }

    fn sample_tx() -> Transaction {
        Transaction::transfer(0, 0, 1, Address::repeat_byte(2), U256::from(100u64), 21_000, 1)
    }

    #[test]
    fn test_sign_and_recover_sender() {
        let signer = Signer::Eip155 { chain_id: 1 };
        let sk = key(1);
        let tx = sample_tx().sign(&signer, &sk);

        let expected = address_from_public_key(sk.verifying_key().as_bytes());
        assert_eq!(signer.sender(&tx), Ok(expected));

        let msg = tx.as_message(&signer).unwrap();
        assert_eq!(msg.from, expected);
        assert_eq!(msg.to, Some(Address::repeat_byte(2)));
        assert_eq!(msg.value, U256::from(100u64));
        assert_eq!(msg.block_number, 0);
        assert_eq!(msg.with_block_number(12).block_number, 12);
    }

    #[test]
    fn test_chain_id_binds_signature() {
        let tx = sample_tx().sign(&Signer::Eip155 { chain_id: 1 }, &key(1));
        assert_eq!(
            Signer::Eip155 { chain_id: 2 }.sender(&tx),
            Err(SignerError::InvalidSignature)
        );
        assert_eq!(Signer::Legacy.sender(&tx), Err(SignerError::InvalidSignature));
    }

    #[test]
    fn test_legacy_signature() {
        let tx = sample_tx().sign(&Signer::Legacy, &key(3));
        assert!(Signer::Legacy.sender(&tx).is_ok());
    }

    #[test]
    fn test_tampered_transaction_rejected() {
        let signer = Signer::Legacy;
        let mut tx = sample_tx().sign(&signer, &key(1));
        tx.value = U256::from(1_000_000u64);
        assert_eq!(signer.sender(&tx), Err(SignerError::InvalidSignature));
    }

    #[test]
    fn test_unsigned_transaction_has_invalid_key_or_signature() {
        let tx = sample_tx();
        assert!(Signer::Legacy.sender(&tx).is_err());
    }

    #[test]
    fn test_signer_for_epoch() {
        let config = ChainConfig {
            chain_id: 9,
            eip155_epoch: Some(3),
            ..ChainConfig::default()
        };
        assert_eq!(Signer::for_epoch(&config, 2), Signer::Legacy);
        assert_eq!(Signer::for_epoch(&config, 3), Signer::Eip155 { chain_id: 9 });
    }

    #[test]
    fn test_hash_covers_signature() {
        let unsigned = sample_tx();
        let signed = unsigned.clone().sign(&Signer::Legacy, &key(1));
        assert_ne!(unsigned.hash(), signed.hash());
        assert_eq!(signed.hash(), signed.clone().hash());
    }

    #[test]
    fn test_shard_accessors() {
        let tx = sample_tx();
        assert_eq!(tx.shard_id(), 0);
        assert_eq!(tx.to_shard_id(), Ok(1));

        let staking = Transaction::staking(0, 0, StakingKind::Delegate, vec![], 50_000, 1);
        assert!(staking.is_staking());
        assert_eq!(staking.staking_kind(), Some(StakingKind::Delegate));
        assert_eq!(
            staking.to_shard_id(),
            Err(TransactionError::MissingDestinationShard)
        );
        assert_eq!(staking.to(), None);
    }

    #[test]
    fn test_creation_transaction() {
        let tx = Transaction::create(0, 1, vec![0x60, 0x00], U256::ZERO, 100_000, 1);
        assert!(tx.is_creation());
        assert_eq!(tx.to(), None);
        assert_eq!(tx.to_shard_id(), Ok(1));
        let msg = tx.sign(&Signer::Legacy, &key(4)).as_message(&Signer::Legacy).unwrap();
        assert!(msg.is_creation());
    }

    #[test]
    fn test_category_cross_shard() {
        assert!(TxCategory::SubtractionOnly.is_cross_shard());
        assert!(!TxCategory::SameShard.is_cross_shard());
        assert!(!TxCategory::Staking(StakingKind::Delegate).is_cross_shard());
        assert!(!TxCategory::Invalid.is_cross_shard());
    }
}
