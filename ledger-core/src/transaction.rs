use shared::{Hash256, PublicKeyBytes, SignatureBytes};
use std::fmt;

/// Identifier of a [`Transaction`]: the SHA-256 digest of its contents.
pub type TxId = Hash256;

/// A single-coin transfer.
///
/// A coinbase transaction has no `input` and creates one new coin awarded
/// to its `output`. Every other transaction spends exactly one previously
/// unspent transaction, named by `input`, and is signed by that
/// transaction's recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    output: PublicKeyBytes,
    input: Option<TxId>,
    signature: SignatureBytes,
}

impl Transaction {
    /// Builds a coinbase transaction awarding a coin to `output`.
    #[must_use]
    pub const fn coinbase(output: PublicKeyBytes, signature: SignatureBytes) -> Self {
        Self {
            output,
            input: None,
            signature,
        }
    }

    /// Builds a transaction that spends `input` and pays `output`.
    #[must_use]
    pub const fn spend(output: PublicKeyBytes, input: TxId, signature: SignatureBytes) -> Self {
        Self {
            output,
            input: Some(input),
            signature,
        }
    }

    #[must_use]
    pub const fn output(&self) -> &PublicKeyBytes {
        &self.output
    }

    #[must_use]
    pub fn input(&self) -> Option<&TxId> {
        self.input.as_ref()
    }

    #[must_use]
    pub const fn signature(&self) -> &SignatureBytes {
        &self.signature
    }

    /// True iff this transaction has no input, i.e. it mints a coin.
    #[must_use]
    pub const fn is_coinbase(&self) -> bool {
        self.input.is_none()
    }

    /// The transaction's identifier: `SHA256(output || input-or-empty || signature)`.
    #[must_use]
    pub fn identifier(&self) -> TxId {
        let mut buf = Vec::with_capacity(32 + 32 + 64);
        buf.extend_from_slice(&self.output);
        if let Some(input) = &self.input {
            buf.extend_from_slice(input.as_bytes());
        }
        buf.extend_from_slice(&self.signature);
        Hash256::sha256(&buf)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tx {} ({})",
            self.identifier(),
            if self.is_coinbase() { "coinbase" } else { "spend" }
        )
    }
}
