use crate::transaction::{Transaction, TxId};
use shared::PublicKeyBytes;
use std::collections::HashMap;

/// The set of transactions whose output has not been consumed by any
/// chain transaction — semantically a set keyed by [`TxId`], backed by a
/// hash map for O(1) spend checks.
#[derive(Debug, Clone, Default)]
pub struct UtxoSet {
    coins: HashMap<TxId, Transaction>,
}

impl UtxoSet {
    #[must_use]
    pub fn new() -> Self {
        Self {
            coins: HashMap::new(),
        }
    }

    /// Adds `tx` as an unspent coin, keyed by its identifier.
    pub fn insert(&mut self, tx: Transaction) {
        self.coins.insert(tx.identifier(), tx);
    }

    /// Removes the coin with identifier `id`, if present.
    pub fn remove(&mut self, id: &TxId) -> Option<Transaction> {
        self.coins.remove(id)
    }

    #[must_use]
    pub fn contains(&self, id: &TxId) -> bool {
        self.coins.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &TxId) -> Option<&Transaction> {
        self.coins.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.coins.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Number of coins owned by `address`, each worth one coin.
    #[must_use]
    pub fn balance_of(&self, address: &PublicKeyBytes) -> usize {
        self.coins.values().filter(|tx| tx.output() == address).count()
    }

    /// Coins owned by `address`.
    pub fn owned_by<'a>(&'a self, address: &'a PublicKeyBytes) -> impl Iterator<Item = &'a Transaction> {
        self.coins.values().filter(move |tx| tx.output() == address)
    }
}
