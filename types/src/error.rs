//! Errors raised while constructing the fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid account identifier: {0:?}")]
    InvalidAccount(String),

    #[error("invalid hex digest: {0}")]
    InvalidHex(String),

    #[error("text is {len} bytes, limit is {max}")]
    TextTooLong { len: usize, max: usize },
}
