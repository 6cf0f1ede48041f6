use crate::constants::GENESIS_BLOCK_PREV;
use crate::transaction::Transaction;
use shared::Hash256;
use std::fmt;

/// A block's identifier, or the reserved genesis sentinel.
///
/// Ordinary block hashes are 32-byte SHA-256 digests, but the genesis
/// sentinel is the 7-byte literal `b"Genesis"` — `Hash256`'s fixed-size
/// array can't represent both, so `BlockHash` is a small byte buffer
/// instead, mirroring the Python prototype's untyped `bytes` alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockHash(Vec<u8>);

impl BlockHash {
    /// The reserved "no previous block" sentinel.
    #[must_use]
    pub fn genesis() -> Self {
        Self(GENESIS_BLOCK_PREV.to_vec())
    }

    /// Wraps a 32-byte SHA-256 digest as a block identifier.
    #[must_use]
    pub fn from_digest(digest: Hash256) -> Self {
        Self(digest.as_bytes().to_vec())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn is_genesis(&self) -> bool {
        self.0 == GENESIS_BLOCK_PREV
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_genesis() {
            write!(f, "Genesis")
        } else {
            write!(f, "{}", hex::encode(&self.0))
        }
    }
}

/// An ordered bundle of transactions, chained to its predecessor by hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    prev_block_hash: BlockHash,
    transactions: Vec<Transaction>,
}

impl Block {
    /// Builds a block. Does not validate structure — see
    /// [`crate::validation::validate_block_structure`].
    #[must_use]
    pub const fn new(prev_block_hash: BlockHash, transactions: Vec<Transaction>) -> Self {
        Self {
            prev_block_hash,
            transactions,
        }
    }

    #[must_use]
    pub const fn prev_block_hash(&self) -> &BlockHash {
        &self.prev_block_hash
    }

    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Number of coinbase transactions contained in this block.
    #[must_use]
    pub fn coinbase_count(&self) -> usize {
        self.transactions.iter().filter(|tx| tx.is_coinbase()).count()
    }

    /// The block's identifier: `SHA256(concat(txids) || prev_block_hash)`.
    #[must_use]
    pub fn identifier(&self) -> BlockHash {
        let mut buf = Vec::with_capacity(self.transactions.len() * 32 + self.prev_block_hash.as_bytes().len());
        for tx in &self.transactions {
            buf.extend_from_slice(tx.identifier().as_bytes());
        }
        buf.extend_from_slice(self.prev_block_hash.as_bytes());
        BlockHash::from_digest(Hash256::sha256(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BLOCK_SIZE;
    use shared::PublicKeyBytes;

    fn pubkey(byte: u8) -> PublicKeyBytes {
        [byte; 32]
    }

    #[test]
    fn genesis_sentinel_is_seven_bytes() {
        let genesis = BlockHash::genesis();
        assert_eq!(genesis.as_bytes(), b"Genesis");
        assert!(genesis.is_genesis());
    }

    #[test]
    fn block_identifier_is_deterministic() {
        let coinbase = Transaction::coinbase(pubkey(1), [0u8; 64]);
        let block = Block::new(BlockHash::genesis(), vec![coinbase]);
        assert_eq!(block.identifier(), block.identifier());
    }

    #[test]
    fn block_identifier_depends_on_prev_hash() {
        let coinbase = Transaction::coinbase(pubkey(1), [0u8; 64]);
        let block_a = Block::new(BlockHash::genesis(), vec![coinbase.clone()]);
        let block_b = Block::new(BlockHash::from_digest(Hash256::sha256(b"other")), vec![coinbase]);
        assert_ne!(block_a.identifier(), block_b.identifier());
    }

    #[test]
    fn single_coinbase_block_has_valid_shape() {
        let coinbase = Transaction::coinbase(pubkey(1), [0u8; 64]);
        let block = Block::new(BlockHash::genesis(), vec![coinbase]);
        let hash = block.identifier();
        assert!(crate::validation::validate_block_structure(&block, &hash));
    }

    #[test]
    fn block_without_coinbase_is_invalid_shape() {
        let input_id = Hash256::sha256(b"spent");
        let spend = Transaction::spend(pubkey(2), input_id, [0u8; 64]);
        let block = Block::new(BlockHash::genesis(), vec![spend]);
        let hash = block.identifier();
        assert!(!crate::validation::validate_block_structure(&block, &hash));
    }

    #[test]
    fn block_with_two_coinbases_is_invalid_shape() {
        let c1 = Transaction::coinbase(pubkey(1), [1u8; 64]);
        let c2 = Transaction::coinbase(pubkey(2), [2u8; 64]);
        let block = Block::new(BlockHash::genesis(), vec![c1, c2]);
        let hash = block.identifier();
        assert!(!crate::validation::validate_block_structure(&block, &hash));
    }

    #[test]
    fn oversized_block_is_invalid_shape() {
        let mut txs: Vec<Transaction> = vec![Transaction::coinbase(pubkey(0), [0u8; 64])];
        for i in 1..=BLOCK_SIZE {
            txs.push(Transaction::spend(
                pubkey(1),
                Hash256::sha256(&[i as u8]),
                [0u8; 64],
            ));
        }
        let block = Block::new(BlockHash::genesis(), txs);
        let hash = block.identifier();
        assert!(!crate::validation::validate_block_structure(&block, &hash));
    }
}
