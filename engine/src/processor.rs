//! Block processor: the per-block state transition.
//!
//! `StateProcessor::process` runs the block lifecycle:
//!
//! 1. Resolve the committer's payout identity
//! 2. For each transaction, in order:
//!    a. Set the state db's transaction context
//!    b. Apply it, collecting the receipt and any outgoing cross-shard receipt
//! 3. Credit every incoming cross-shard receipt proof
//! 4. Decode the header's slash records
//! 5. Finalize rewards and slashing through the consensus engine
//!
//! **Atomicity:** the first error aborts the block and no partial output
//! is returned. State changes already made are not rolled back; callers
//! discard the state db of a rejected block.

use tessera_primitives::{Block, ChainConfig, CxReceipt, GasPool, Hash, Log, Receipt, SlashRecords};

use crate::chain::ChainContext;
use crate::consensus::{ConsensusEngine, FinalizedBlock, RewardPayout};
use crate::error::ProcessError;
use crate::executor::apply_transaction;
use crate::incoming::apply_incoming_receipt;
use crate::state::StateDb;
use crate::vm::{Vm, VmConfig};

/// Everything a processed block produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// One receipt per transaction, in transaction order.
    pub receipts: Vec<Receipt>,
    /// Cross-shard credits to be settled on destination shards.
    pub outgoing_receipts: Vec<CxReceipt>,
    /// Logs of every receipt, in order.
    pub logs: Vec<Log>,
    /// Gas used by all transactions.
    pub gas_used: u64,
    /// Rewards and penalties applied at finalization.
    pub payout: RewardPayout,
    /// Header with the final state root.
    pub finalized: FinalizedBlock,
}

/// Replays blocks on top of a state db.
///
/// Holds no per-block state: the gas pool and every accumulator live in
/// a single `process` call. The chain configuration is read from the
/// chain context, the same one the consensus engine finalizes against.
pub struct StateProcessor<C, E, V> {
    chain: C,
    engine: E,
    vm: V,
}

impl<C, E, V> StateProcessor<C, E, V>
where
    C: ChainContext,
    E: ConsensusEngine,
    V: Vm,
{
    pub fn new(chain: C, engine: E, vm: V) -> Self {
        Self {
            chain,
            engine,
            vm,
        }
    }

    pub fn config(&self) -> &ChainConfig {
        self.chain.config()
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    /// Process `block` against `state`.
    pub fn process(
        &self,
        block: &Block,
        state: &mut dyn StateDb,
        vm_config: &VmConfig,
    ) -> Result<ProcessOutput, ProcessError> {
        let header = &block.header;
        let block_hash = block.hash();
        tracing::info!(
            shard_id = header.shard_id,
            epoch = header.epoch,
            number = header.number,
            txs = block.tx_count(),
            incoming = block.incoming_receipts.len(),
            "processing block"
        );

        let result = self.process_inner(block, block_hash, state, vm_config);
        match &result {
            Ok(output) => tracing::info!(
                number = header.number,
                gas_used = output.gas_used,
                receipts = output.receipts.len(),
                outgoing = output.outgoing_receipts.len(),
                state_root = %output.finalized.header.state_root,
                "processed block"
            ),
            Err(err) => tracing::warn!(
                number = header.number,
                error = %err,
                "block aborted"
            ),
        }
        result
    }

    fn process_inner(
        &self,
        block: &Block,
        block_hash: Hash,
        state: &mut dyn StateDb,
        vm_config: &VmConfig,
    ) -> Result<ProcessOutput, ProcessError> {
        let header = &block.header;
        let config = self.chain.config();
        let committer = self.chain.committer_identity(header)?;

        let mut gas_pool = GasPool::new(header.gas_limit);
        let mut used_gas = 0u64;
        let mut receipts = Vec::with_capacity(block.tx_count());
        let mut outgoing_receipts = Vec::new();
        let mut logs = Vec::new();

        for (index, tx) in block.transactions.iter().enumerate() {
            state.prepare(tx.hash(), block_hash, index as u32);
            let applied = apply_transaction(
                config,
                &self.vm,
                committer,
                &mut gas_pool,
                state,
                header,
                tx,
                &mut used_gas,
                vm_config,
            )?;
            logs.extend(applied.receipt.logs.iter().cloned());
            receipts.push(applied.receipt);
            if let Some(cx) = applied.cx_receipt {
                outgoing_receipts.push(cx);
            }
        }

        for proof in &block.incoming_receipts {
            apply_incoming_receipt(config, state, header, Some(proof))?;
        }

        let slashes = if header.has_slashes() {
            SlashRecords::decode(&header.slashes).map_err(ProcessError::SlashRecordDecode)?
        } else {
            SlashRecords::default()
        };

        let (finalized, payout) = self.engine.finalize(
            &self.chain,
            header,
            state,
            &block.transactions,
            &receipts,
            &outgoing_receipts,
            &block.incoming_receipts,
            &slashes,
        )?;

        Ok(ProcessOutput {
            receipts,
            outgoing_receipts,
            logs,
            gas_used: used_gas,
            payout,
            finalized,
        })
    }
}
