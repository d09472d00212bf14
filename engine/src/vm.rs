//! Virtual machine interface and the native transfer machine.
//!
//! The VM turns a recovered [`Message`] into state changes. It buys gas
//! from the sender and the block gas pool up front, refunds what is left
//! afterwards and pays the fee for used gas to the committer.
//!
//! Two kinds of failure are kept apart:
//! - a [`VmError`] means the message could not be run at all (bad nonce,
//!   no funds for gas, pool exhausted) and aborts the whole block;
//! - [`ExecutionOutcome::failed`] means the message ran and failed. Its
//!   effects are reverted, gas is still charged and a receipt is produced.

use tessera_primitives::crypto::{create_address, hash_blake3};
use tessera_primitives::gas::{gas_cost_code_deposit, gas_cost_log, intrinsic_gas};
use tessera_primitives::types::gas_fee;
use tessera_primitives::{
    Address, BlockNumber, Epoch, GasPool, GasPoolError, Hash, Log, Message, ShardId, TxCategory,
};

use crate::error::VmError;
use crate::state::StateDb;

/// Per-call VM options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmConfig {
    /// Emit a `trace` event for every executed message.
    pub trace: bool,
}

/// Block and transaction context a message executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmContext {
    /// Recovered sender.
    pub origin: Address,
    /// Fee recipient: the block committer.
    pub coinbase: Address,
    pub block_number: BlockNumber,
    pub epoch: Epoch,
    pub shard_id: ShardId,
    pub category: TxCategory,
    pub gas_price: u64,
}

/// Result of running one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Output of the call; the deployed code for creations.
    pub return_data: Vec<u8>,
    /// Gas charged, intrinsic gas included.
    pub gas_used: u64,
    /// The message ran but its effects were reverted.
    pub failed: bool,
}

/// Executes messages against the state db.
pub trait Vm {
    fn execute(
        &self,
        ctx: &VmContext,
        msg: &Message,
        state: &mut dyn StateDb,
        gas_pool: &mut GasPool,
        config: &VmConfig,
    ) -> Result<ExecutionOutcome, VmError>;
}

/// Topic of the log emitted when a call reaches an account holding code.
pub fn call_topic() -> Hash {
    hash_blake3(b"Call(address,address,uint256)")
}

/// Native value-transfer machine.
///
/// Accounts holding code do not run it; a call to such an account moves
/// value and emits a call log carrying the call data.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferVm;

/// How a message body ended, before gas settlement.
enum Body {
    Done { gas_left: u64, return_data: Vec<u8> },
    Failed { gas_left: u64 },
}

impl TransferVm {
    pub fn new() -> Self {
        Self
    }

    fn run_body(
        ctx: &VmContext,
        msg: &Message,
        state: &mut dyn StateDb,
        next_nonce: u64,
        gas_left: u64,
    ) -> Result<Body, VmError> {
        let from = msg.from;
        match ctx.category {
            TxCategory::Invalid => Err(VmError::InvalidCategory),
            TxCategory::Staking(_) => {
                state.set_nonce(from, next_nonce);
                Ok(Body::Done {
                    gas_left,
                    return_data: Vec::new(),
                })
            }
            TxCategory::SubtractionOnly => {
                state.set_nonce(from, next_nonce);
                if state.balance(&from) < msg.value {
                    return Ok(Body::Failed { gas_left });
                }
                // Credit is settled on the destination shard.
                state.sub_balance(from, msg.value);
                Ok(Body::Done {
                    gas_left,
                    return_data: Vec::new(),
                })
            }
            TxCategory::SameShard => match msg.to {
                None => Ok(Self::create(msg, state, next_nonce, gas_left)),
                Some(to) => Ok(Self::call(ctx, msg, to, state, next_nonce, gas_left)),
            },
        }
    }

    fn create(msg: &Message, state: &mut dyn StateDb, next_nonce: u64, gas_left: u64) -> Body {
        let from = msg.from;
        let contract = create_address(&from, msg.nonce);
        state.set_nonce(from, next_nonce);

        let snapshot = state.snapshot();
        if state.balance(&from) < msg.value {
            state.revert_to_snapshot(snapshot);
            return Body::Failed { gas_left };
        }
        if state.nonce(&contract) != 0 || !state.code(&contract).is_empty() {
            state.revert_to_snapshot(snapshot);
            return Body::Failed { gas_left: 0 };
        }

        state.create_account(contract);
        state.set_nonce(contract, 1);
        state.sub_balance(from, msg.value);
        state.add_balance(contract, msg.value);

        let deposit = gas_cost_code_deposit(msg.data.len());
        if deposit > gas_left {
            state.revert_to_snapshot(snapshot);
            return Body::Failed { gas_left: 0 };
        }
        state.set_code(contract, msg.data.clone());
        Body::Done {
            gas_left: gas_left - deposit,
            return_data: msg.data.clone(),
        }
    }

    fn call(
        ctx: &VmContext,
        msg: &Message,
        to: Address,
        state: &mut dyn StateDb,
        next_nonce: u64,
        gas_left: u64,
    ) -> Body {
        let from = msg.from;
        state.set_nonce(from, next_nonce);

        let snapshot = state.snapshot();
        if state.balance(&from) < msg.value {
            state.revert_to_snapshot(snapshot);
            return Body::Failed { gas_left };
        }
        state.sub_balance(from, msg.value);
        state.add_balance(to, msg.value);

        if state.code(&to).is_empty() {
            return Body::Done {
                gas_left,
                return_data: Vec::new(),
            };
        }

        let cost = gas_cost_log(msg.data.len());
        if cost > gas_left {
            state.revert_to_snapshot(snapshot);
            return Body::Failed { gas_left: 0 };
        }
        let mut log = Log::new(
            to,
            vec![call_topic(), from.into_word(), Hash::from(msg.value.to_be_bytes::<32>())],
            msg.data.clone(),
        );
        log.block_number = ctx.block_number;
        state.add_log(log);
        Body::Done {
            gas_left: gas_left - cost,
            return_data: Vec::new(),
        }
    }
}

impl Vm for TransferVm {
    fn execute(
        &self,
        ctx: &VmContext,
        msg: &Message,
        state: &mut dyn StateDb,
        gas_pool: &mut GasPool,
        config: &VmConfig,
    ) -> Result<ExecutionOutcome, VmError> {
        let from = msg.from;
        if ctx.category == TxCategory::Invalid {
            return Err(VmError::InvalidCategory);
        }

        let expected = state.nonce(&from);
        if expected != msg.nonce {
            return Err(VmError::NonceMismatch {
                address: from,
                expected,
                got: msg.nonce,
            });
        }
        let next_nonce = msg.nonce.checked_add(1).ok_or(VmError::NonceOverflow {
            address: from,
            nonce: msg.nonce,
        })?;

        let is_staking = matches!(ctx.category, TxCategory::Staking(_));
        let is_creation = !is_staking && msg.is_creation();
        let intrinsic = intrinsic_gas(&msg.data, is_creation, is_staking);
        if msg.gas_limit < intrinsic {
            return Err(VmError::IntrinsicGas {
                gas_limit: msg.gas_limit,
                intrinsic,
            });
        }

        // Buy gas: the sender pays for the full limit, the pool reserves it.
        let upfront = gas_fee(msg.gas_limit, msg.gas_price);
        let balance = state.balance(&from);
        if balance < upfront {
            return Err(VmError::InsufficientBalanceForGas {
                address: from,
                balance,
                required: upfront,
            });
        }
        gas_pool.sub_gas(msg.gas_limit).map_err(|err| match err {
            GasPoolError::Exhausted {
                available,
                requested,
            } => VmError::GasLimitReached {
                available,
                requested,
            },
        })?;
        state.sub_balance(from, upfront);

        let (gas_left, return_data, failed) =
            match Self::run_body(ctx, msg, state, next_nonce, msg.gas_limit - intrinsic)? {
                Body::Done {
                    gas_left,
                    return_data,
                } => (gas_left, return_data, false),
                Body::Failed { gas_left } => (gas_left, Vec::new(), true),
            };

        // Refund unused gas, then pay the committer for what was used.
        state.add_balance(from, gas_fee(gas_left, msg.gas_price));
        gas_pool.add_gas(gas_left);
        let gas_used = msg.gas_limit - gas_left;
        state.add_balance(ctx.coinbase, gas_fee(gas_used, msg.gas_price));

        if config.trace {
            tracing::trace!(
                from = %from,
                to = ?msg.to,
                nonce = msg.nonce,
                value = %msg.value,
                gas_used,
                failed,
                "executed message"
            );
        }

        Ok(ExecutionOutcome {
            return_data,
            gas_used,
            failed,
        })
    }
}
