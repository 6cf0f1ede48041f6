//! Node behavior (C6): mining, transaction admission, fork discovery,
//! reorg, and gossip propagation.
//!
//! A [`Node`] is a cheap handle (`Rc<RefCell<Inner>>`) around a peer's
//! mutable state. Peers reference each other by [`Weak`] handle keyed by
//! address, so a ring of connected nodes never forms an `Rc` cycle — the
//! caller's own `Node` variables are the only strong owners.
//!
//! All operations run to completion synchronously; a `RefCell` borrow is
//! never held across a reentrant call into a peer, matching the
//! single-threaded cooperative scheduling model this protocol requires.

use crate::block::{Block, BlockHash};
use crate::constants::NUM_OF_MEMPOOL_TXS_PER_BLOCK;
use crate::error::{CoreError, CoreResult};
use crate::state::{apply_block, introduce_valid_transaction, rollback_to, NodeState};
use crate::transaction::{Transaction, TxId};
use crate::validation::validate_transaction_pre_admission;
use rand::RngCore;
use shared::{PrivateKeyBytes, PublicKeyBytes};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};
use zeroize::Zeroize;

struct Inner {
    private_key: PrivateKeyBytes,
    public_key: PublicKeyBytes,
    state: NodeState,
    peers: HashMap<PublicKeyBytes, Weak<RefCell<Inner>>>,
    id_index: HashMap<TxId, Transaction>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

/// A participant in the decentralized ledger: identity, state, and peers.
#[derive(Clone)]
pub struct Node(Rc<RefCell<Inner>>);

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("address", &hex::encode(self.address()))
            .finish()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// Creates a node with a fresh keypair and empty state.
    #[must_use]
    pub fn new() -> Self {
        let (private_key, public_key) = shared::generate_keys();
        Self(Rc::new(RefCell::new(Inner {
            private_key,
            public_key,
            state: NodeState::new(),
            peers: HashMap::new(),
            id_index: HashMap::new(),
        })))
    }

    // ---- queries (C4.3) ----------------------------------------------

    #[must_use]
    pub fn address(&self) -> PublicKeyBytes {
        self.0.borrow().public_key
    }

    /// Live peer handles. Peers that have since been dropped elsewhere
    /// are silently skipped.
    #[must_use]
    pub fn connections(&self) -> Vec<Node> {
        self.0
            .borrow()
            .peers
            .values()
            .filter_map(|weak| weak.upgrade().map(Node))
            .collect()
    }

    #[must_use]
    pub fn mempool(&self) -> Vec<Transaction> {
        self.0.borrow().state.mempool.clone()
    }

    #[must_use]
    pub fn utxo(&self) -> Vec<Transaction> {
        self.0.borrow().state.utxo.iter().cloned().collect()
    }

    /// Number of UTXO entries owned by this node's address.
    #[must_use]
    pub fn balance(&self) -> usize {
        let inner = self.0.borrow();
        inner.state.utxo.balance_of(&inner.public_key)
    }

    /// The tip of this node's chain, or the genesis sentinel if empty.
    #[must_use]
    pub fn latest_hash(&self) -> BlockHash {
        self.0.borrow().state.latest_hash()
    }

    /// Looks up a block by hash in this node's chain.
    ///
    /// # Errors
    /// Returns [`CoreError::UnknownBlock`] if no such block is known.
    pub fn get_block(&self, hash: &BlockHash) -> CoreResult<Block> {
        self.0
            .borrow()
            .state
            .chain
            .iter()
            .find(|block| block.identifier() == *hash)
            .cloned()
            .ok_or(CoreError::UnknownBlock)
    }

    fn knows_tx(&self, txid: &TxId) -> bool {
        self.0
            .borrow()
            .state
            .mempool
            .iter()
            .any(|tx| tx.identifier() == *txid)
    }

    fn has_peer(&self, address: &PublicKeyBytes) -> bool {
        self.0.borrow().peers.contains_key(address)
    }

    // ---- peer management (C4.4) ---------------------------------------

    /// Establishes a bidirectional connection. Fails on self-connect;
    /// no-ops if already connected. The peer is given a chance to catch
    /// up on this node's chain (and vice versa) via one notification
    /// each — mempool is *not* synchronized on connect.
    ///
    /// # Errors
    /// Returns [`CoreError::SelfConnect`] if `other` is this same node.
    pub fn connect(&self, other: &Node) -> CoreResult<()> {
        if other.address() == self.address() {
            return Err(CoreError::SelfConnect);
        }
        if self.has_peer(&other.address()) {
            return Ok(());
        }
        self.0
            .borrow_mut()
            .peers
            .insert(other.address(), Rc::downgrade(&other.0));
        tracing::debug!(self = %hex::encode(self.address()), peer = %hex::encode(other.address()), "connected to peer");
        other.connect(self)?;
        let latest = self.latest_hash();
        other.get_introduced_to_new_block(latest, self);
        Ok(())
    }

    /// Symmetric, idempotent disconnect. No notifications are sent.
    pub fn disconnect_from(&self, other: &Node) {
        if !self.has_peer(&other.address()) {
            return;
        }
        self.0.borrow_mut().peers.remove(&other.address());
        tracing::debug!(self = %hex::encode(self.address()), peer = %hex::encode(other.address()), "disconnected from peer");
        other.disconnect_from(self);
    }

    // ---- transaction admission (C4.5) ----------------------------------

    /// Admits `tx` to the mempool if it passes pre-admission validation,
    /// then propagates it to every peer that doesn't already know it.
    /// Returns whether it was admitted.
    pub fn add_transaction_to_mempool(&self, tx: Transaction) -> bool {
        let admissible = {
            let inner = self.0.borrow();
            validate_transaction_pre_admission(&tx, &inner.state, &inner.id_index)
        };
        if !admissible {
            tracing::debug!(tx = %tx, "rejected transaction from mempool admission");
            return false;
        }
        {
            let mut inner = self.0.borrow_mut();
            inner.state.mempool.push(tx.clone());
            inner.id_index.insert(tx.identifier(), tx.clone());
        }
        tracing::debug!(tx = %tx, "admitted transaction to mempool");
        let txid = tx.identifier();
        for peer in self.connections() {
            if !peer.knows_tx(&txid) {
                peer.add_transaction_to_mempool(tx.clone());
            }
        }
        true
    }

    // ---- transaction creation (C4.6) -----------------------------------

    /// Spends one of this node's unspent, unpromised coins to `target`.
    /// Returns `None` if every owned coin is already spent or promised by
    /// a pending mempool entry.
    #[must_use]
    pub fn create_transaction(&self, target: PublicKeyBytes) -> Option<Transaction> {
        let (coin_id, private_key) = {
            let inner = self.0.borrow();
            let owned: Vec<TxId> = inner
                .state
                .utxo
                .owned_by(&inner.public_key)
                .map(Transaction::identifier)
                .collect();
            let owned_set: HashSet<TxId> = owned.iter().copied().collect();
            let frozen: HashSet<TxId> = inner
                .state
                .mempool
                .iter()
                .filter_map(Transaction::input)
                .filter(|input_id| owned_set.contains(*input_id))
                .copied()
                .collect();
            let available = owned.into_iter().find(|id| !frozen.contains(id))?;
            (available, inner.private_key)
        };

        let mut message = Vec::with_capacity(64);
        message.extend_from_slice(coin_id.as_bytes());
        message.extend_from_slice(&target);
        let signature = shared::sign(&message, &private_key);
        let tx = Transaction::spend(target, coin_id, signature);

        self.add_transaction_to_mempool(tx.clone());
        Some(tx)
    }

    // ---- mining (C4.7) --------------------------------------------------

    /// Mines a block from one fresh coinbase plus up to
    /// `BLOCK_SIZE - NUM_OF_COINBASE_PER_BLOCK` pending mempool
    /// transactions, applies it to this node's own state without
    /// re-validation, and publishes it to peers.
    pub fn mine_block(&self) -> BlockHash {
        let (block, public_key) = {
            let inner = self.0.borrow();
            let mut signature = [0u8; 64];
            rand::thread_rng().fill_bytes(&mut signature);
            let coinbase = Transaction::coinbase(inner.public_key, signature);
            let mut transactions = vec![coinbase];
            transactions.extend(
                inner
                    .state
                    .mempool
                    .iter()
                    .take(NUM_OF_MEMPOOL_TXS_PER_BLOCK)
                    .cloned(),
            );
            let block = Block::new(inner.state.latest_hash(), transactions);
            (block, inner.public_key)
        };

        {
            let mut inner = self.0.borrow_mut();
            for tx in block.transactions() {
                introduce_valid_transaction(tx, &mut inner.state, &mut inner.id_index);
            }
            inner.state.chain.push(block.clone());
        }

        let hash = block.identifier();
        tracing::info!(miner = %hex::encode(public_key), block = %hash, "mined block");
        self.publish_latest_block();
        hash
    }

    // ---- block ingestion and reorg (C4.8) -------------------------------

    /// Handles a peer's announcement of a new block tip. Walks backward
    /// from `block_hash` through `sender` to find the fork point,
    /// speculatively replays the candidate branch, and adopts it only if
    /// it yields a strictly longer chain than the incumbent.
    pub fn get_introduced_to_new_block(&self, block_hash: BlockHash, sender: &Node) {
        let chain_hashes = self.0.borrow().state.chain_hashes();
        if chain_hashes.contains(&block_hash) {
            return;
        }

        let mut branch: Vec<Block> = Vec::new();
        let mut branch_hashes: Vec<BlockHash> = Vec::new();
        let mut running_hash = block_hash;
        let fork_index = loop {
            if let Some(pos) = chain_hashes.iter().position(|h| *h == running_hash) {
                break pos;
            }
            let block = match sender.get_block(&running_hash) {
                Ok(block) => block,
                Err(_) => {
                    // sender is inconsistent with its own announcement; abandon silently
                    return;
                }
            };
            let prev_hash = block.prev_block_hash().clone();
            branch.insert(0, block);
            branch_hashes.insert(0, running_hash);
            running_hash = prev_hash;
        };

        let potential_len = fork_index + 1 + branch.len();
        if potential_len <= chain_hashes.len() {
            return;
        }

        let fork_hash = chain_hashes[fork_index].clone();
        let adopted = {
            let mut inner = self.0.borrow_mut();
            let mut candidate = inner.state.clone();
            rollback_to(&fork_hash, &mut candidate, &inner.id_index);
            for (block, expected_hash) in branch.iter().zip(branch_hashes.iter()) {
                if !apply_block(block, expected_hash, &mut candidate, &mut inner.id_index) {
                    break;
                }
            }
            if candidate.chain.len() > inner.state.chain.len() {
                inner.state = candidate;
                true
            } else {
                false
            }
        };

        if adopted {
            tracing::info!(node = %hex::encode(self.address()), new_tip = %self.latest_hash(), "adopted longer branch");
            self.publish_latest_block();
        } else {
            tracing::debug!(node = %hex::encode(self.address()), "rejected branch: not strictly longer");
        }
    }

    /// Discards every pending mempool transaction without propagating
    /// anything to peers.
    pub fn clear_mempool(&self) {
        self.0.borrow_mut().state.mempool.clear();
    }

    // ---- publication (C4.11) --------------------------------------------

    fn publish_latest_block(&self) {
        let latest = self.latest_hash();
        for peer in self.connections() {
            peer.get_introduced_to_new_block(latest.clone(), self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_node_has_empty_state() {
        let node = Node::new();
        assert!(node.utxo().is_empty());
        assert!(node.mempool().is_empty());
        assert_eq!(node.balance(), 0);
        assert!(node.latest_hash().is_genesis());
        assert!(node.create_transaction(node.address()).is_none());
    }

    #[test]
    fn single_mine_produces_one_coin() {
        let node = Node::new();
        let hash = node.mine_block();
        assert!(!hash.is_genesis());
        assert_eq!(node.latest_hash(), hash);
        assert_eq!(node.balance(), 1);
        assert_eq!(node.utxo().len(), 1);
        assert!(node.mempool().is_empty());

        let block = node.get_block(&hash).unwrap();
        assert!(block.prev_block_hash().is_genesis());
        assert_eq!(block.transactions().len(), 1);
        assert!(block.transactions()[0].is_coinbase());
        assert_eq!(block.transactions()[0].output(), &node.address());
    }

    #[test]
    fn unknown_block_lookup_fails() {
        let node = Node::new();
        assert!(node.get_block(&BlockHash::genesis()).is_err());
        let junk = BlockHash::from_digest(shared::Hash256::sha256(b"junk"));
        assert!(node.get_block(&junk).is_err());

        let hash = node.mine_block();
        assert!(node.get_block(&junk).is_err());
        assert!(node.get_block(&hash).is_ok());
    }

    #[test]
    fn self_connect_fails() {
        let node = Node::new();
        assert_eq!(node.connect(&node.clone()), Err(CoreError::SelfConnect));
    }

    #[test]
    fn connect_is_idempotent_and_symmetric() {
        let a = Node::new();
        let b = Node::new();
        a.connect(&b).unwrap();
        assert_eq!(a.connections().len(), 1);
        assert_eq!(b.connections().len(), 1);
        // no-op, doesn't duplicate or error
        a.connect(&b).unwrap();
        assert_eq!(a.connections().len(), 1);
    }

    #[test]
    fn propagation_and_non_adoption() {
        let a = Node::new();
        let b = Node::new();
        let c = Node::new();
        a.connect(&b).unwrap();

        let h1 = a.mine_block();
        assert_eq!(b.latest_hash(), h1);
        assert!(c.latest_hash().is_genesis());

        let h2 = b.mine_block();
        assert_eq!(a.latest_hash(), h2);
        assert_eq!(b.latest_hash(), h2);

        let hc = c.mine_block();
        assert_eq!(c.latest_hash(), hc);
        assert_eq!(a.latest_hash(), h2);
        assert_eq!(b.latest_hash(), h2);
    }

    #[test]
    fn spend_flow_moves_balance_between_nodes() {
        let a = Node::new();
        let b = Node::new();

        a.mine_block();
        assert_eq!(a.balance(), 1);

        let tx = a.create_transaction(b.address()).unwrap();
        assert_eq!(tx.input(), Some(&a.utxo()[0].identifier()));
        assert!(a.mempool().contains(&tx));
        assert_eq!(b.balance(), 0);

        b.connect(&a).unwrap();
        assert_eq!(b.balance(), 0, "mempool is not synced on connect");

        b.mine_block();
        assert_eq!(b.balance(), 1);
        assert!(b.mempool().is_empty());

        a.mine_block();
        assert!(a.mempool().is_empty());
        assert_eq!(a.balance(), 1);
        assert_eq!(b.balance(), 2);
    }

    #[test]
    fn reorg_adopts_strictly_longer_branch_after_tie() {
        let a = Node::new();
        let b = Node::new();
        a.connect(&b).unwrap();
        a.disconnect_from(&b);

        a.mine_block();
        a.mine_block();
        b.mine_block();
        b.mine_block();

        a.connect(&b).unwrap();
        // equal length branches: neither adopts the other
        assert_ne!(a.latest_hash(), b.latest_hash());
        let a_tip_before = a.latest_hash();
        let b_tip_before = b.latest_hash();

        let h3 = a.mine_block();
        assert_eq!(a.latest_hash(), h3);
        // b rolled back its two blocks and adopted a's three-block chain
        assert_eq!(b.latest_hash(), h3);
        assert_ne!(b.latest_hash(), b_tip_before);
        assert_ne!(a_tip_before, h3);
    }
}
