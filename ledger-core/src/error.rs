use std::fmt;

/// Errors surfaced by [`crate::node::Node`]'s fallible-by-necessity
/// operations. Every other surface (`add_transaction_to_mempool`,
/// `create_transaction`, `get_introduced_to_new_block`) reports failure
/// through a `bool`/`Option` return instead of an error, per the
/// protocol's error handling design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// Attempted to connect a node to itself.
    SelfConnect,
    /// `get_block` was asked for a hash not present in the chain.
    UnknownBlock,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfConnect => write!(f, "cannot connect a node to itself"),
            Self::UnknownBlock => write!(f, "unknown block"),
        }
    }
}

impl std::error::Error for CoreError {}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
