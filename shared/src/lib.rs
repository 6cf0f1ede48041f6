pub mod crypto;
pub mod error;
pub mod hash;
pub mod types;

pub use crypto::{generate_keys, public_key_from_slice, sign, signature_from_slice, verify};
pub use error::CryptoError;
pub use hash::Hash256;
pub use types::{PrivateKeyBytes, PublicKeyBytes, SignatureBytes};

pub type Result<T> = std::result::Result<T, CryptoError>;
