//! Crediting proven cross-shard receipts on the destination shard.

use tessera_primitives::{ChainConfig, CxReceiptsProof, Header};

use crate::error::ProcessError;
use crate::state::StateDb;

/// Credit every receipt of `proof` to its recipient.
///
/// Receipts are applied in order and the state root is brought up to date
/// after each credit. A receipt without a recipient aborts
/// with [`ProcessError::InvalidIncomingReceipt`]; receipts before it stay
/// applied and receipts after it are not touched. Applying the same proof
/// twice credits twice: deduplication belongs to the caller.
pub fn apply_incoming_receipt(
    config: &ChainConfig,
    state: &mut dyn StateDb,
    header: &Header,
    proof: Option<&CxReceiptsProof>,
) -> Result<(), ProcessError> {
    let Some(proof) = proof else {
        return Ok(());
    };
    let delete_empty = config.is_s3(header.epoch);
    tracing::debug!(
        source_shard = proof.shard_id,
        source_block = proof.block_number,
        receipts = proof.receipts.len(),
        total = %proof.total_amount(),
        "applying incoming receipt batch"
    );

    for (index, cx) in proof.receipts.iter().enumerate() {
        let Some(to) = cx.to else {
            return Err(ProcessError::InvalidIncomingReceipt {
                index,
                tx_hash: cx.tx_hash,
            });
        };
        if !state.exist(&to) {
            state.create_account(to);
        }
        state.add_balance(to, cx.amount);
        state.intermediate_root(delete_empty);
        tracing::info!(
            tx = %cx.tx_hash,
            to = %to,
            amount = %cx.amount,
            from_shard = cx.shard_id,
            source_block = proof.block_number,
            "applied incoming cross-shard receipt"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemStateDb;
    use tessera_primitives::{Account, Address, CxReceipt, Hash, Log, U256, ZERO_ADDRESS, ZERO_HASH};

    /// Counts root computations over an in-memory state db.
    #[derive(Default)]
    struct RootCounter {
        inner: MemStateDb,
        roots: usize,
    }

    impl StateDb for RootCounter {
        fn exist(&self, address: &Address) -> bool {
            self.inner.exist(address)
        }
        fn create_account(&mut self, address: Address) {
            self.inner.create_account(address)
        }
        fn balance(&self, address: &Address) -> U256 {
            self.inner.balance(address)
        }
        fn add_balance(&mut self, address: Address, amount: U256) {
            self.inner.add_balance(address, amount)
        }
        fn sub_balance(&mut self, address: Address, amount: U256) {
            self.inner.sub_balance(address, amount)
        }
        fn nonce(&self, address: &Address) -> u64 {
            self.inner.nonce(address)
        }
        fn set_nonce(&mut self, address: Address, nonce: u64) {
            self.inner.set_nonce(address, nonce)
        }
        fn code(&self, address: &Address) -> Vec<u8> {
            self.inner.code(address)
        }
        fn set_code(&mut self, address: Address, code: Vec<u8>) {
            self.inner.set_code(address, code)
        }
        fn add_log(&mut self, log: Log) {
            self.inner.add_log(log)
        }
        fn logs(&self, tx_hash: &Hash) -> Vec<Log> {
            self.inner.logs(tx_hash)
        }
        fn prepare(&mut self, tx_hash: Hash, block_hash: Hash, tx_index: u32) {
            self.inner.prepare(tx_hash, block_hash, tx_index)
        }
        fn snapshot(&mut self) -> usize {
            self.inner.snapshot()
        }
        fn revert_to_snapshot(&mut self, revision: usize) {
            self.inner.revert_to_snapshot(revision)
        }
        fn finalise(&mut self, delete_empty: bool) {
            self.inner.finalise(delete_empty)
        }
        fn intermediate_root(&mut self, delete_empty: bool) -> Hash {
            self.roots += 1;
            self.inner.intermediate_root(delete_empty)
        }
    }

    fn header() -> Header {
        Header {
            shard_id: 2,
            epoch: 1,
            number: 4,
            parent_hash: ZERO_HASH,
            state_root: ZERO_HASH,
            timestamp: 0,
            gas_limit: 1_000_000,
            coinbase: ZERO_ADDRESS,
            slashes: Vec::new(),
        }
    }

    fn cx(to: Option<Address>, amount: u64) -> CxReceipt {
        CxReceipt {
            tx_hash: Hash::repeat_byte(amount as u8),
            from: Address::repeat_byte(0xF0),
            to,
            shard_id: 0,
            to_shard_id: 2,
            amount: U256::from(amount),
        }
    }

    fn proof(receipts: Vec<CxReceipt>) -> CxReceiptsProof {
        CxReceiptsProof {
            receipts,
            block_number: 9,
            block_hash: Hash::repeat_byte(0x99),
            shard_id: 0,
        }
    }

    #[test]
    fn test_absent_proof_is_noop() {
        let mut state = MemStateDb::new();
        assert!(apply_incoming_receipt(&ChainConfig::default(), &mut state, &header(), None).is_ok());
    }

    #[test]
    fn test_credits_recipients() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let mut state = MemStateDb::new();
        let p = proof(vec![cx(Some(a), 10), cx(Some(b), 20), cx(Some(a), 5)]);

        apply_incoming_receipt(&ChainConfig::default(), &mut state, &header(), Some(&p)).unwrap();
        assert_eq!(state.balance(&a), U256::from(15u64));
        assert_eq!(state.balance(&b), U256::from(20u64));
    }

    #[test]
    fn test_missing_recipient_stops_batch() {
        let a = Address::repeat_byte(1);
        let c = Address::repeat_byte(3);
        let mut state = MemStateDb::new();
        let p = proof(vec![cx(Some(a), 10), cx(None, 20), cx(Some(c), 30)]);

        let err =
            apply_incoming_receipt(&ChainConfig::default(), &mut state, &header(), Some(&p))
                .unwrap_err();
        assert_eq!(
            err,
            ProcessError::InvalidIncomingReceipt {
                index: 1,
                tx_hash: Hash::repeat_byte(20),
            }
        );
        assert_eq!(state.balance(&a), U256::from(10u64));
        assert!(!state.exist(&c));
    }

    #[test]
    fn test_not_idempotent() {
        let a = Address::repeat_byte(1);
        let mut state = MemStateDb::new();
        let p = proof(vec![cx(Some(a), 10)]);
        let config = ChainConfig::default();

        apply_incoming_receipt(&config, &mut state, &header(), Some(&p)).unwrap();
        apply_incoming_receipt(&config, &mut state, &header(), Some(&p)).unwrap();
        assert_eq!(state.balance(&a), U256::from(20u64));
    }

    #[test]
    fn test_root_maintained_after_each_credit() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let config = ChainConfig::default();

        let mut state = RootCounter::default();
        let p = proof(vec![cx(Some(a), 10), cx(Some(b), 20), cx(Some(a), 5)]);
        apply_incoming_receipt(&config, &mut state, &header(), Some(&p)).unwrap();
        assert_eq!(state.roots, 3);
        // Every credit is folded into committed state.
        assert_eq!(state.inner.committed_root(), state.inner.intermediate_root(true));

        let mut state = RootCounter::default();
        apply_incoming_receipt(&config, &mut state, &header(), Some(&proof(vec![]))).unwrap();
        assert_eq!(state.roots, 0);
    }

    #[test]
    fn test_credits_before_failure_are_committed() {
        let a = Address::repeat_byte(1);
        let mut state = RootCounter::default();
        let p = proof(vec![cx(Some(a), 10), cx(None, 20)]);

        assert!(
            apply_incoming_receipt(&ChainConfig::default(), &mut state, &header(), Some(&p))
                .is_err()
        );
        assert_eq!(state.roots, 1);
        let committed = MemStateDb::with_accounts([(a, Account::with_balance(U256::from(10u64)))]);
        assert_eq!(state.inner.committed_root(), committed.committed_root());
    }
}
