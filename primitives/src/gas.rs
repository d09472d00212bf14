//! Gas accounting: the per-block gas pool and the intrinsic gas schedule.
//!
//! The pool is created once per block from the header gas limit and handed
//! by `&mut` through the transaction loop. The same block under the same
//! chain configuration must consume identical gas on every node.

use crate::error::GasPoolError;

// ── Gas cost constants ──

/// Base cost of any transaction.
pub const G_TX: u64 = 21_000;

/// Base cost of a contract-creating transaction.
pub const G_TX_CREATE: u64 = 53_000;

/// Base cost of a staking transaction.
pub const G_TX_STAKING: u64 = 21_000;

/// Cost per zero byte of transaction data.
pub const G_TX_DATA_ZERO: u64 = 4;

/// Cost per non-zero byte of transaction data.
pub const G_TX_DATA_NON_ZERO: u64 = 68;

/// Cost per byte of deployed contract code.
pub const G_CODE_DEPOSIT: u64 = 200;

/// Base cost of emitting a log.
pub const G_LOG: u64 = 375;

/// Cost per byte of log data.
pub const G_LOG_DATA: u64 = 8;

/// Compute the gas charged before any execution takes place.
///
/// Saturates instead of overflowing; a saturated value can never be
/// covered by a real gas limit so the transaction is rejected downstream.
pub fn intrinsic_gas(data: &[u8], is_creation: bool, is_staking: bool) -> u64 {
    let base = if is_staking {
        G_TX_STAKING
    } else if is_creation {
        G_TX_CREATE
    } else {
        G_TX
    };
    let non_zero = data.iter().filter(|b| **b != 0).count() as u64;
    let zero = data.len() as u64 - non_zero;
    base.saturating_add(non_zero.saturating_mul(G_TX_DATA_NON_ZERO))
        .saturating_add(zero.saturating_mul(G_TX_DATA_ZERO))
}

/// Compute the gas charged for emitting a log with `data_len` bytes.
pub fn gas_cost_log(data_len: usize) -> u64 {
    G_LOG.saturating_add((data_len as u64).saturating_mul(G_LOG_DATA))
}

/// Compute the gas charged for depositing contract code.
pub fn gas_cost_code_deposit(code_len: usize) -> u64 {
    (code_len as u64).saturating_mul(G_CODE_DEPOSIT)
}

/// Remaining gas available to the transactions of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPool {
    gas: u64,
}

impl GasPool {
    /// Create a pool holding the block gas limit.
    pub fn new(limit: u64) -> Self {
        Self { gas: limit }
    }

    /// Return gas to the pool (unused gas refunded after a transaction).
    pub fn add_gas(&mut self, amount: u64) -> &mut Self {
        self.gas = self.gas.saturating_add(amount);
        self
    }

    /// Take gas from the pool.
    ///
    /// The pool is left unchanged when it cannot cover `amount`.
    pub fn sub_gas(&mut self, amount: u64) -> Result<(), GasPoolError> {
        if amount > self.gas {
            return Err(GasPoolError::Exhausted {
                available: self.gas,
                requested: amount,
            });
        }
        self.gas -= amount;
        Ok(())
    }

    /// Gas still available.
    pub fn gas(&self) -> u64 {
        self.gas
    }
}
