//! Wire-visible constants that govern hash computations and block shape.

/// The reserved "no previous block" sentinel. Not a SHA-256 output — a
/// distinguished 7-byte literal standing in for a genesis block that is
/// never actually materialized as a [`crate::Block`].
pub const GENESIS_BLOCK_PREV: &[u8] = b"Genesis";

/// Maximum number of transactions a block may contain.
pub const BLOCK_SIZE: usize = 10;

/// Number of coinbase transactions required per block.
pub const NUM_OF_COINBASE_PER_BLOCK: usize = 1;

/// Maximum number of mempool transactions pulled into a mined block.
pub const NUM_OF_MEMPOOL_TXS_PER_BLOCK: usize = BLOCK_SIZE - NUM_OF_COINBASE_PER_BLOCK;

/// Length in bytes of a SHA-256 digest.
pub const SHA256_DIGEST_LEN: usize = 32;

/// Length in bytes of an Ed25519 signature.
pub const SIGNATURE_LEN: usize = 64;
