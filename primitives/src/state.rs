//! Account model and the transactional account overlay.
//!
//! The overlay buffers account writes during block execution and makes
//! them visible to later reads in the same block. Writes are folded into
//! committed state when the block's state is finalised.

use std::collections::BTreeMap;

use crate::types::{Address, U256};

/// Account record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    pub nonce: u64,
    pub balance: U256,
    /// Contract code; empty for externally owned accounts.
    pub code: Vec<u8>,
}

impl Account {
    /// Account holding only a balance.
    pub fn with_balance(balance: U256) -> Self {
        Self {
            balance,
            ..Self::default()
        }
    }

    /// Zero nonce, zero balance, no code.
    ///
    /// Empty accounts are pruned at finalisation once empty-account
    /// deletion is active.
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balance.is_zero() && self.code.is_empty()
    }
}

/// Result of looking up an address in the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayResult {
    /// Account was written in the overlay.
    Found(Account),
    /// Account was deleted in the overlay.
    Deleted,
    /// Untouched; the caller must check committed state.
    NotInOverlay,
}

/// Buffered account writes over committed state.
///
/// Backed by a `BTreeMap` so draining yields accounts in address order.
#[derive(Debug, Clone, Default)]
pub struct AccountOverlay {
    /// `Some(account)` for writes, `None` for deletions.
    writes: BTreeMap<Address, Option<Account>>,
}

impl AccountOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write an account, replacing any earlier write or deletion.
    pub fn set(&mut self, address: Address, account: Account) {
        self.writes.insert(address, Some(account));
    }

    /// Mark an account deleted so reads stop falling through to committed state.
    pub fn delete(&mut self, address: Address) {
        self.writes.insert(address, None);
    }

    pub fn get(&self, address: &Address) -> OverlayResult {
        match self.writes.get(address) {
            Some(Some(account)) => OverlayResult::Found(account.clone()),
            Some(None) => OverlayResult::Deleted,
            None => OverlayResult::NotInOverlay,
        }
    }

    /// True if the overlay holds a write or deletion for `address`.
    pub fn contains(&self, address: &Address) -> bool {
        self.writes.contains_key(address)
    }

    /// Consume the overlay, yielding writes in address order.
    pub fn drain(self) -> BTreeMap<Address, Option<Account>> {
        self.writes
    }

    pub fn writes(&self) -> &BTreeMap<Address, Option<Account>> {
        &self.writes
    }

    /// Number of touched accounts.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::repeat_byte(b)
    }

    #[test]
    fn test_account_is_empty() {
        assert!(Account::default().is_empty());
        assert!(!Account::with_balance(U256::from(1u64)).is_empty());
        let contract = Account {
            code: vec![0x60],
            ..Account::default()
        };
        assert!(!contract.is_empty());
        let used = Account {
            nonce: 1,
            ..Account::default()
        };
        assert!(!used.is_empty());
    }

    #[test]
    fn test_overlay_set_and_get() {
        let mut overlay = AccountOverlay::new();
        let account = Account::with_balance(U256::from(5u64));
        overlay.set(addr(1), account.clone());
        assert_eq!(overlay.get(&addr(1)), OverlayResult::Found(account));
        assert_eq!(overlay.get(&addr(2)), OverlayResult::NotInOverlay);
    }

    #[test]
    fn test_overlay_delete_then_set() {
        let mut overlay = AccountOverlay::new();
        overlay.delete(addr(1));
        assert_eq!(overlay.get(&addr(1)), OverlayResult::Deleted);
        assert!(overlay.contains(&addr(1)));

        overlay.set(addr(1), Account::default());
        assert_eq!(overlay.get(&addr(1)), OverlayResult::Found(Account::default()));
        assert_eq!(overlay.len(), 1);
    }

    #[test]
    fn test_overlay_drain_order() {
        let mut overlay = AccountOverlay::new();
        overlay.set(addr(3), Account::default());
        overlay.set(addr(1), Account::default());
        overlay.delete(addr(2));

        let writes = overlay.drain();
        let keys: Vec<Address> = writes.keys().copied().collect();
        assert_eq!(keys, vec![addr(1), addr(2), addr(3)]);
        assert_eq!(writes[&addr(2)], None);
    }
}
