//! Committed account set and its deterministic state root.
//!
//! Accounts are kept sorted by address. Each account becomes a leaf
//! `H(LEAF_PREFIX || address || encode_account(account))` and leaves are
//! hashed pairwise into a binary tree, an odd node being promoted.

use std::collections::BTreeMap;

use crate::codec::encode_account;
use crate::crypto::hash_blake3;
use crate::state::Account;
use crate::types::{Address, Hash, ZERO_HASH};

/// Domain separator for leaf nodes.
const LEAF_PREFIX: u8 = 0x00;
/// Domain separator for internal nodes.
const INTERNAL_PREFIX: u8 = 0x01;

/// Committed accounts keyed by address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountTrie {
    accounts: BTreeMap<Address, Account>,
}

impl AccountTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: Address, account: Account) {
        self.accounts.insert(address, account);
    }

    pub fn get(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Fold a batch of overlay writes in. `None` removes the account.
    pub fn apply_writes(&mut self, writes: BTreeMap<Address, Option<Account>>) {
        for (address, account) in writes {
            match account {
                Some(account) => {
                    self.accounts.insert(address, account);
                }
                None => {
                    self.accounts.remove(&address);
                }
            }
        }
    }

    /// Root over all accounts. An empty set has the zero root.
    pub fn root(&self) -> Hash {
        let leaves: Vec<Hash> = self
            .accounts
            .iter()
            .map(|(address, account)| hash_leaf(address, account))
            .collect();
        compute_root_from_leaves(leaves)
    }
}

fn hash_leaf(address: &Address, account: &Account) -> Hash {
    let value = encode_account(account);
    let mut data = Vec::with_capacity(1 + 20 + value.len());
    data.push(LEAF_PREFIX);
    data.extend_from_slice(address.as_slice());
    data.extend_from_slice(&value);
    hash_blake3(&data)
}

fn hash_internal(left: &Hash, right: &Hash) -> Hash {
    let mut data = [0u8; 1 + 32 + 32];
    data[0] = INTERNAL_PREFIX;
    data[1..33].copy_from_slice(left.as_slice());
    data[33..65].copy_from_slice(right.as_slice());
    hash_blake3(&data)
}

fn compute_root_from_leaves(mut level: Vec<Hash>) -> Hash {
    if level.is_empty() {
        return ZERO_HASH;
    }
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => hash_internal(left, right),
                [single] => *single,
                _ => unreachable!("chunks(2) yields one or two elements"),
            })
            .collect();
    }
    level[0]
}
