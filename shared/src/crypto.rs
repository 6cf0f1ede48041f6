//! Ed25519 signing adapter backing the ledger's transaction signatures.
//!
//! This module owns every cryptographic primitive used by the workspace,
//! the same way the rest of `shared` owns hashing: callers pass and receive
//! raw fixed-size byte arrays so the domain crate never touches a signing
//! library directly.

use crate::error::{CryptoError, Result};
use crate::types::{PrivateKeyBytes, PublicKeyBytes, SignatureBytes};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;

/// Generates a fresh Ed25519 keypair.
#[must_use]
pub fn generate_keys() -> (PrivateKeyBytes, PublicKeyBytes) {
    let signing_key = SigningKey::generate(&mut OsRng);
    (signing_key.to_bytes(), signing_key.verifying_key().to_bytes())
}

/// Signs `message` with the given private key.
#[must_use]
pub fn sign(message: &[u8], private_key: &PrivateKeyBytes) -> SignatureBytes {
    let signing_key = SigningKey::from_bytes(private_key);
    signing_key.sign(message).to_bytes()
}

/// Verifies `signature` over `message` under `public_key`.
///
/// Never panics: a malformed public key or signature simply fails to
/// verify rather than raising, matching the Python prototype's bare
/// `except: return False`.
#[must_use]
pub fn verify(message: &[u8], signature: &SignatureBytes, public_key: &PublicKeyBytes) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let signature = ed25519_dalek::Signature::from_bytes(signature);
    verifying_key.verify(message, &signature).is_ok()
}

/// Parses a variable-length public key received as raw bytes (e.g. from an
/// untrusted wire source) into the fixed-size form the adapter's other
/// functions require.
///
/// # Errors
/// Returns [`CryptoError::InvalidKeySize`] if `bytes` is not exactly 32 bytes.
pub fn public_key_from_slice(bytes: &[u8]) -> Result<PublicKeyBytes> {
    bytes.try_into().map_err(|_| CryptoError::InvalidKeySize {
        expected: 32,
        actual: bytes.len(),
    })
}

/// Parses a variable-length signature received as raw bytes into the
/// fixed-size form the adapter's other functions require.
///
/// # Errors
/// Returns [`CryptoError::InvalidSignatureSize`] if `bytes` is not exactly 64
/// bytes.
pub fn signature_from_slice(bytes: &[u8]) -> Result<SignatureBytes> {
    bytes.try_into().map_err(|_| CryptoError::InvalidSignatureSize {
        expected: 64,
        actual: bytes.len(),
    })
}
