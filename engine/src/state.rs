//! World-state interface and the in-memory state db.
//!
//! The `StateDb` trait decouples block processing from the storage
//! backend. The processor, executor, VM and consensus engine all reach
//! account state only through it.
//!
//! `MemStateDb` keeps committed accounts in an [`AccountTrie`] and buffers
//! dirty accounts in an [`AccountOverlay`]. Reads reflect committed state
//! plus buffered writes; `finalise` folds the overlay into committed state.

use tessera_primitives::{
    Account, AccountOverlay, AccountTrie, Address, Hash, Log, OverlayResult, U256,
};

/// Versioned account state touched by block processing.
pub trait StateDb {
    /// Returns true if the account exists, even if empty.
    fn exist(&self, address: &Address) -> bool;

    /// Create an account, keeping any balance it already holds.
    fn create_account(&mut self, address: Address);

    fn balance(&self, address: &Address) -> U256;

    fn add_balance(&mut self, address: Address, amount: U256);

    /// Debit `amount`. Callers check the balance first; the debit saturates at zero.
    fn sub_balance(&mut self, address: Address, amount: U256);

    fn nonce(&self, address: &Address) -> u64;

    fn set_nonce(&mut self, address: Address, nonce: u64);

    fn code(&self, address: &Address) -> Vec<u8>;

    fn set_code(&mut self, address: Address, code: Vec<u8>);

    /// Record a log, stamping it with the context set by [`StateDb::prepare`].
    fn add_log(&mut self, log: Log);

    /// Logs recorded for one transaction, in emission order.
    fn logs(&self, tx_hash: &Hash) -> Vec<Log>;

    /// Set the transaction context used to stamp subsequent logs.
    fn prepare(&mut self, tx_hash: Hash, block_hash: Hash, tx_index: u32);

    /// Capture a revision that `revert_to_snapshot` can return to.
    fn snapshot(&mut self) -> usize;

    /// Discard every change made since `revision` was taken.
    fn revert_to_snapshot(&mut self, revision: usize);

    /// Fold dirty accounts into committed state, pruning empty ones when
    /// `delete_empty` is set. Invalidates outstanding snapshots.
    fn finalise(&mut self, delete_empty: bool);

    /// Finalise and return the resulting state root.
    fn intermediate_root(&mut self, delete_empty: bool) -> Hash;
}

#[derive(Debug, Clone, Default)]
struct TxContext {
    tx_hash: Hash,
    block_hash: Hash,
    tx_index: u32,
}

#[derive(Debug, Clone)]
struct Revision {
    overlay: AccountOverlay,
    log_count: usize,
}

/// In-memory state db.
#[derive(Debug, Clone, Default)]
pub struct MemStateDb {
    /// Committed accounts.
    committed: AccountTrie,
    /// Accounts written since the last `finalise`.
    overlay: AccountOverlay,
    /// Every log recorded, in emission order.
    logs: Vec<Log>,
    context: TxContext,
    revisions: Vec<Revision>,
}

impl MemStateDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// State db seeded with committed accounts.
    pub fn with_accounts(accounts: impl IntoIterator<Item = (Address, Account)>) -> Self {
        let mut committed = AccountTrie::new();
        for (address, account) in accounts {
            committed.insert(address, account);
        }
        Self {
            committed,
            ..Self::default()
        }
    }

    /// Current view of an account, `None` if it does not exist.
    pub fn account(&self, address: &Address) -> Option<Account> {
        match self.overlay.get(address) {
            OverlayResult::Found(account) => Some(account),
            OverlayResult::Deleted => None,
            OverlayResult::NotInOverlay => self.committed.get(address).cloned(),
        }
    }

    /// Root of the committed accounts, ignoring unfinalised writes.
    pub fn committed_root(&self) -> Hash {
        self.committed.root()
    }

    /// Every log recorded so far.
    pub fn all_logs(&self) -> &[Log] {
        &self.logs
    }

    fn account_or_default(&self, address: &Address) -> Account {
        self.account(address).unwrap_or_default()
    }

    fn update(&mut self, address: Address, f: impl FnOnce(&mut Account)) {
        let mut account = self.account_or_default(&address);
        f(&mut account);
        self.overlay.set(address, account);
    }
}

impl StateDb for MemStateDb {
    fn exist(&self, address: &Address) -> bool {
        self.account(address).is_some()
    }

    fn create_account(&mut self, address: Address) {
        let balance = self.balance(&address);
        self.overlay.set(address, Account::with_balance(balance));
    }

    fn balance(&self, address: &Address) -> U256 {
        self.account(address).map(|a| a.balance).unwrap_or(U256::ZERO)
    }

    fn add_balance(&mut self, address: Address, amount: U256) {
        self.update(address, |a| a.balance = a.balance.saturating_add(amount));
    }

    fn sub_balance(&mut self, address: Address, amount: U256) {
        self.update(address, |a| a.balance = a.balance.saturating_sub(amount));
    }

    fn nonce(&self, address: &Address) -> u64 {
        self.account(address).map(|a| a.nonce).unwrap_or(0)
    }

    fn set_nonce(&mut self, address: Address, nonce: u64) {
        self.update(address, |a| a.nonce = nonce);
    }

    fn code(&self, address: &Address) -> Vec<u8> {
        self.account(address).map(|a| a.code).unwrap_or_default()
    }

    fn set_code(&mut self, address: Address, code: Vec<u8>) {
        self.update(address, |a| a.code = code);
    }

    fn add_log(&mut self, mut log: Log) {
        log.tx_hash = self.context.tx_hash;
        log.block_hash = self.context.block_hash;
        log.tx_index = self.context.tx_index;
        log.index = self.logs.len() as u32;
        self.logs.push(log);
    }

    fn logs(&self, tx_hash: &Hash) -> Vec<Log> {
        self.logs
            .iter()
            .filter(|log| &log.tx_hash == tx_hash)
            .cloned()
            .collect()
    }

    fn prepare(&mut self, tx_hash: Hash, block_hash: Hash, tx_index: u32) {
        self.context = TxContext {
            tx_hash,
            block_hash,
            tx_index,
        };
    }

    fn snapshot(&mut self) -> usize {
        self.revisions.push(Revision {
            overlay: self.overlay.clone(),
            log_count: self.logs.len(),
        });
        self.revisions.len() - 1
    }

    fn revert_to_snapshot(&mut self, revision: usize) {
        if revision >= self.revisions.len() {
            return;
        }
        let mut dropped = self.revisions.split_off(revision);
        let target = dropped.swap_remove(0);
        self.overlay = target.overlay;
        self.logs.truncate(target.log_count);
    }

    fn finalise(&mut self, delete_empty: bool) {
        if delete_empty {
            let empty: Vec<Address> = self
                .overlay
                .writes()
                .iter()
                .filter(|(_, account)| account.as_ref().is_some_and(Account::is_empty))
                .map(|(address, _)| *address)
                .collect();
            for address in empty {
                self.overlay.delete(address);
            }
        }
        let writes = std::mem::take(&mut self.overlay).drain();
        self.committed.apply_writes(writes);
        self.revisions.clear();
    }

    fn intermediate_root(&mut self, delete_empty: bool) -> Hash {
        self.finalise(delete_empty);
        self.committed.root()
    }
}
