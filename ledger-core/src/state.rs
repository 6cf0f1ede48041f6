//! Per-node mutable state (C5) and the rollback/roll-forward machinery
//! that keeps chain, UTXO set, and mempool consistent across reorgs.

use crate::block::{Block, BlockHash};
use crate::transaction::{Transaction, TxId};
use crate::utxo::UtxoSet;
use crate::validation::{validate_block_structure, validate_transaction_pre_admission};
use std::collections::{HashMap, HashSet};

/// A node's chain, UTXO set and mempool. Cloned wholesale to stage a
/// speculative reorg; `id_index` is deliberately *not* part of this
/// struct — it lives on the node and is never rolled back (see
/// [`crate::node::Node`]).
#[derive(Debug, Clone, Default)]
pub struct NodeState {
    pub chain: Vec<Block>,
    pub utxo: UtxoSet,
    pub mempool: Vec<Transaction>,
}

impl NodeState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The tip of the chain, or the genesis sentinel if the chain is empty.
    #[must_use]
    pub fn latest_hash(&self) -> BlockHash {
        self.chain
            .last()
            .map(Block::identifier)
            .unwrap_or_else(BlockHash::genesis)
    }

    /// The ordered list of block identifiers known to this state, starting
    /// with the genesis sentinel.
    #[must_use]
    pub fn chain_hashes(&self) -> Vec<BlockHash> {
        let mut hashes = Vec::with_capacity(self.chain.len() + 1);
        hashes.push(BlockHash::genesis());
        hashes.extend(self.chain.iter().map(Block::identifier));
        hashes
    }
}

/// Removes a transaction's effect on mempool/UTXO once it is (or was)
/// accepted into the chain: any mempool entries that collide with it are
/// purged, the coin it spent (if any) is removed from the UTXO set, and
/// the transaction itself becomes a new unspent coin.
pub(crate) fn introduce_valid_transaction(
    tx: &Transaction,
    state: &mut NodeState,
    id_index: &mut HashMap<TxId, Transaction>,
) {
    let txid = tx.identifier();
    state
        .mempool
        .retain(|pending| pending.identifier() != txid && pending.input() != tx.input());
    if let Some(input_id) = tx.input() {
        state.utxo.remove(input_id);
    }
    state.utxo.insert(tx.clone());
    id_index.insert(txid, tx.clone());
}

/// Pops the tip block off `state`, undoing its effect on the UTXO set and
/// mempool, and returns it. `id_index` must already contain every input
/// the popped block's transactions spent (invariant upheld by every path
/// that ever applies a block).
///
/// # Panics
/// Panics if `state.chain` is empty, or if a spent input is missing from
/// `id_index` — both indicate a broken invariant rather than a recoverable
/// runtime condition.
pub(crate) fn rollback_latest_block(
    state: &mut NodeState,
    id_index: &HashMap<TxId, Transaction>,
) -> Block {
    let block = state.chain.pop().expect("rollback on empty chain");

    for tx in block.transactions() {
        state.utxo.remove(&tx.identifier());
    }
    for tx in block.transactions() {
        if let Some(input_id) = tx.input() {
            let restored = id_index
                .get(input_id)
                .expect("id_index must contain every spent input")
                .clone();
            state.utxo.insert(restored);
        }
    }

    let spent_ids: HashSet<TxId> = block.transactions().iter().map(Transaction::identifier).collect();
    state
        .mempool
        .retain(|tx| tx.input().map_or(true, |input_id| !spent_ids.contains(input_id)));

    block
}

/// Rolls `state` back, one block at a time, until its tip is `fork_hash`.
pub(crate) fn rollback_to(
    fork_hash: &BlockHash,
    state: &mut NodeState,
    id_index: &HashMap<TxId, Transaction>,
) {
    while state.latest_hash() != *fork_hash {
        rollback_latest_block(state, id_index);
    }
}

/// Validates and applies a single block to `state`.
///
/// Every non-coinbase transaction is checked against `state` *before* any
/// of the block's transactions are applied — a later transaction in the
/// same block may not spend an earlier one (intra-block chaining is
/// forbidden). If any transaction fails, `state` is left completely
/// unchanged and this returns `false`.
pub(crate) fn apply_block(
    block: &Block,
    expected_hash: &BlockHash,
    state: &mut NodeState,
    id_index: &mut HashMap<TxId, Transaction>,
) -> bool {
    if !validate_block_structure(block, expected_hash) {
        return false;
    }
    let all_valid = block
        .transactions()
        .iter()
        .filter(|tx| !tx.is_coinbase())
        .all(|tx| validate_transaction_pre_admission(tx, state, id_index));
    if !all_valid {
        return false;
    }
    for tx in block.transactions() {
        introduce_valid_transaction(tx, state, id_index);
    }
    state.chain.push(block.clone());
    true
}
