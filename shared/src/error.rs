use thiserror::Error;

/// Errors raised by the cryptographic primitives in [`crate::crypto`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid key size: expected {expected}, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("invalid signature size: expected {expected}, got {actual}")]
    InvalidSignatureSize { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, CryptoError>;
