//! Cryptographic operations.
//!
//! - Ed25519 for transaction signatures
//! - SHA-256 for header and transaction hashing
//! - BLAKE3 for state commitments, address derivation and general hashing
//!
//! All operations are deterministic with no randomization.

use crate::types::{Address, Hash};

/// Compute BLAKE3 hash of the input data.
pub fn hash_blake3(data: &[u8]) -> Hash {
    Hash::new(*blake3::hash(data).as_bytes())
}

/// Compute SHA-256 hash of the input data.
pub fn hash_sha256(data: &[u8]) -> Hash {
    use sha2::Digest;
    let result = sha2::Sha256::digest(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    Hash::new(hash)
}

/// Verify an Ed25519 signature.
///
/// Returns `true` if the signature is valid for the given message and
/// public key, `false` otherwise.
pub fn verify_ed25519(message: &[u8], signature: &[u8; 64], public_key: &[u8; 32]) -> bool {
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let sig = Signature::from_bytes(signature);
    verifying_key.verify(message, &sig).is_ok()
}

/// Returns true if `public_key` decodes to a valid Ed25519 point.
pub fn is_valid_public_key(public_key: &[u8; 32]) -> bool {
    ed25519_dalek::VerifyingKey::from_bytes(public_key).is_ok()
}

/// Sign a message with an Ed25519 private key.
///
/// Used by wallets and tests; block processing only verifies.
pub fn sign_ed25519(message: &[u8], secret_key: &ed25519_dalek::SigningKey) -> [u8; 64] {
    use ed25519_dalek::Signer;
    secret_key.sign(message).to_bytes()
}

/// Derive an account address from an Ed25519 public key.
///
/// The address is the last 20 bytes of `BLAKE3(public_key)`.
pub fn address_from_public_key(public_key: &[u8; 32]) -> Address {
    let digest = hash_blake3(public_key);
    Address::from_slice(&digest[12..])
}

/// Derive the address of a contract created by `sender` at `nonce`.
///
/// The address is the last 20 bytes of `BLAKE3(sender || nonce_le)`.
pub fn create_address(sender: &Address, nonce: u64) -> Address {
    let mut preimage = [0u8; 28];
    preimage[..20].copy_from_slice(sender.as_slice());
    preimage[20..].copy_from_slice(&nonce.to_le_bytes());
    let digest = hash_blake3(&preimage);
    Address::from_slice(&digest[12..])
}
