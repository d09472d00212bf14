//! Single-transaction execution.
//!
//! `apply_transaction` classifies a transaction, recovers its sender, runs
//! it through the VM, and builds its receipt plus, for a successful
//! cross-shard debit, the outgoing cross-shard receipt.

use tessera_primitives::crypto::create_address;
use tessera_primitives::receipt::create_bloom;
use tessera_primitives::{
    Address, ChainConfig, CxReceipt, GasPool, Header, Receipt, Signer, Transaction, TxCategory,
};

use crate::classifier::classify_transaction;
use crate::error::ProcessError;
use crate::state::StateDb;
use crate::vm::{Vm, VmConfig, VmContext};

/// Everything produced by one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedTransaction {
    pub receipt: Receipt,
    /// Present only for a cross-shard debit that executed successfully.
    pub cx_receipt: Option<CxReceipt>,
    pub gas_used: u64,
}

/// Apply `tx` to `state` as part of the block described by `header`.
///
/// `used_gas` is the block's running total and is advanced by the gas the
/// transaction consumed. Any error aborts the block; a transaction whose
/// execution fails still succeeds here with a failed receipt.
#[allow(clippy::too_many_arguments)]
pub fn apply_transaction(
    config: &ChainConfig,
    vm: &dyn Vm,
    committer: Address,
    gas_pool: &mut GasPool,
    state: &mut dyn StateDb,
    header: &Header,
    tx: &Transaction,
    used_gas: &mut u64,
    vm_config: &VmConfig,
) -> Result<AppliedTransaction, ProcessError> {
    let epoch = header.epoch;
    let tx_hash = tx.hash();

    let category = classify_transaction(config, header, tx);
    if category == TxCategory::Invalid {
        return Err(ProcessError::InvalidTransactionType { tx_hash });
    }
    if category.is_cross_shard() && !config.accepts_cross_tx(epoch) {
        return Err(ProcessError::CrossShardNotYetEnabled {
            cross_tx_epoch: config.cross_tx_epoch,
            current_epoch: epoch,
        });
    }

    let signer = Signer::for_epoch(config, epoch);
    let msg = tx.as_message(&signer)?.with_block_number(header.number);

    let ctx = VmContext {
        origin: msg.from,
        coinbase: committer,
        block_number: header.number,
        epoch,
        shard_id: header.shard_id,
        category,
        gas_price: msg.gas_price,
    };
    let outcome = vm.execute(&ctx, &msg, state, gas_pool, vm_config)?;

    let post_state = if config.is_s3(epoch) {
        state.finalise(true);
        Vec::new()
    } else {
        state.intermediate_root(false).to_vec()
    };
    *used_gas += outcome.gas_used;

    let mut receipt = Receipt::new(post_state, outcome.failed, *used_gas);
    receipt.tx_hash = tx_hash;
    receipt.gas_used = outcome.gas_used;
    if tx.is_creation() {
        receipt.contract_address = Some(create_address(&msg.from, tx.nonce));
    }
    if config.is_receipt_log(epoch) {
        receipt.logs = state.logs(&tx_hash);
    }
    receipt.bloom = create_bloom(std::slice::from_ref(&receipt));

    // No cross-shard receipt when execution failed.
    let cx_receipt = match tx.to_shard_id() {
        Ok(to_shard_id) if category.is_cross_shard() && !outcome.failed => Some(CxReceipt {
            tx_hash,
            from: msg.from,
            to: tx.to(),
            shard_id: tx.shard_id(),
            to_shard_id,
            amount: tx.value,
        }),
        _ => None,
    };

    tracing::debug!(
        tx = %tx_hash,
        ?category,
        gas_used = outcome.gas_used,
        failed = outcome.failed,
        cross_shard = cx_receipt.is_some(),
        "applied transaction"
    );

    Ok(AppliedTransaction {
        receipt,
        cx_receipt,
        gas_used: outcome.gas_used,
    })
}
