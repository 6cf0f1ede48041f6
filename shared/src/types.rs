//! Shared byte-array aliases used throughout the ledger workspace.

/// Raw Ed25519 private key bytes.
pub type PrivateKeyBytes = [u8; 32];

/// Raw Ed25519 public key bytes, doubling as a node address.
pub type PublicKeyBytes = [u8; 32];

/// Raw Ed25519 signature bytes.
pub type SignatureBytes = [u8; 64];
