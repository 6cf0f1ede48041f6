//! Pure predicates over transactions and block structure (C4).
//!
//! Nothing here mutates state; callers decide what to do with a `false`.

use crate::block::{Block, BlockHash};
use crate::constants::{BLOCK_SIZE, NUM_OF_COINBASE_PER_BLOCK};
use crate::state::NodeState;
use crate::transaction::{Transaction, TxId};
use std::collections::HashMap;

/// Checks a non-coinbase transaction is admissible to a node's mempool or
/// a block being applied to `state`.
///
/// Coinbase transactions are never validated by this predicate — they are
/// admitted only as part of a mined or accepted block.
#[must_use]
pub fn validate_transaction_pre_admission(
    tx: &Transaction,
    state: &NodeState,
    id_index: &HashMap<TxId, Transaction>,
) -> bool {
    let Some(input_id) = tx.input() else {
        return false;
    };
    // the spent transaction must be known to this node; an unknown input
    // is rejected here rather than treated as a missing-key lookup bug
    let Some(spent) = id_index.get(input_id) else {
        return false;
    };
    let mut message = Vec::with_capacity(64);
    message.extend_from_slice(input_id.as_bytes());
    message.extend_from_slice(tx.output());
    if !shared::verify(&message, tx.signature(), spent.output()) {
        return false;
    }
    if !state.utxo.contains(input_id) {
        return false;
    }
    !state
        .mempool
        .iter()
        .any(|pending| pending.input() == Some(input_id))
}

/// Checks a block's shape without validating its individual transactions:
/// its identifier matches `expected_hash`, it carries at most
/// [`BLOCK_SIZE`] transactions, and exactly [`NUM_OF_COINBASE_PER_BLOCK`]
/// of them are coinbase.
#[must_use]
pub fn validate_block_structure(block: &Block, expected_hash: &BlockHash) -> bool {
    block.identifier() == *expected_hash
        && !block.transactions().is_empty()
        && block.transactions().len() <= BLOCK_SIZE
        && block.coinbase_count() == NUM_OF_COINBASE_PER_BLOCK
}
