//! Length-bounded opaque byte strings (poll descriptions, candidate names).

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A short opaque byte string whose length was checked against a limit at
/// construction. The ledger never interprets the bytes.
///
/// No instance is ever longer than [`ShortText::MAX_LEN`], whatever limit the
/// caller asks for. Deserialized values are held to that ceiling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>")]
pub struct ShortText(Vec<u8>);

impl ShortText {
    /// Hard ceiling on any text the ledger stores.
    pub const MAX_LEN: usize = 256;

    pub fn new(bytes: impl Into<Vec<u8>>, max_len: usize) -> Result<Self, TypesError> {
        let bytes = bytes.into();
        let max = max_len.min(Self::MAX_LEN);
        if bytes.len() > max {
            return Err(TypesError::TextTooLong {
                len: bytes.len(),
                max,
            });
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<u8>> for ShortText {
    type Error = TypesError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(bytes, Self::MAX_LEN)
    }
}

impl fmt::Display for ShortText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}
