//! Account identifiers.
//!
//! Accounts are opaque to the ledger: it only compares them for equality
//! (owner, admin, approved voter) and hands them to the transfer primitive.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An account known to the external runtime.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Longest identifier accepted, in bytes.
    pub const MAX_LEN: usize = 64;

    /// Create an account identifier, rejecting empty, oversized or
    /// whitespace-containing strings.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if s.is_empty() || s.len() > Self::MAX_LEN || s.chars().any(char::is_whitespace) {
            return Err(TypesError::InvalidAccount(s));
        }
        Ok(Self(s))
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccountId> for String {
    fn from(account: AccountId) -> Self {
        account.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifier() {
        let account = AccountId::new("0xabc123").unwrap();
        assert_eq!(account.as_str(), "0xabc123");
        assert_eq!(account.to_string(), "0xabc123");
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(AccountId::new("").is_err());
        assert!(AccountId::new("alice bob").is_err());
        assert!(AccountId::new("x".repeat(AccountId::MAX_LEN + 1)).is_err());
    }

    #[test]
    fn serde_rejects_invalid() {
        let ok: AccountId = serde_json::from_str("\"carol\"").unwrap();
        assert_eq!(ok.as_str(), "carol");
        assert!(serde_json::from_str::<AccountId>("\"\"").is_err());
    }
}
