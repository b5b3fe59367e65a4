//! The transfer primitive the voting machine pays out through.

use qvote_types::{AccountId, Amount};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("recipient {0} rejected the transfer")]
    Rejected(AccountId),

    #[error("recipient balance would overflow")]
    Overflow,

    #[error("{0}")]
    Other(String),
}

/// Moves funds out of the ledger's custody to an account.
///
/// A failed transfer must leave the recipient untouched; the machine rolls
/// back its own bookkeeping when this returns an error.
pub trait Treasury {
    fn transfer(&mut self, to: &AccountId, amount: Amount) -> Result<(), TransferError>;
}

/// Simple in-memory account balances.
///
/// Used by the replay daemon as the external environment: callers are debited
/// when they attach a payment and credited when the ledger pays out.
#[derive(Clone, Debug, Default)]
pub struct AccountBook {
    balances: HashMap<AccountId, Amount>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    pub fn credit(&mut self, account: &AccountId, amount: Amount) -> Result<(), TransferError> {
        let entry = self.balances.entry(account.clone()).or_default();
        *entry = entry.checked_add(amount).ok_or(TransferError::Overflow)?;
        Ok(())
    }

    /// Take `amount` from `account`, failing without change if it holds less.
    pub fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<(), TransferError> {
        let current = self.balance(account);
        let remaining = current.checked_sub(amount).ok_or_else(|| {
            TransferError::Other(format!("{account} holds {current}, cannot pay {amount}"))
        })?;
        self.balances.insert(account.clone(), remaining);
        Ok(())
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &Amount)> {
        self.balances.iter()
    }
}

impl Treasury for AccountBook {
    fn transfer(&mut self, to: &AccountId, amount: Amount) -> Result<(), TransferError> {
        self.credit(to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(name: &str) -> AccountId {
        AccountId::new(name).unwrap()
    }

    #[test]
    fn debit_requires_funds() {
        let mut book = AccountBook::new();
        book.credit(&acct("alice"), Amount::new(100)).unwrap();
        assert!(book.debit(&acct("alice"), Amount::new(101)).is_err());
        assert_eq!(book.balance(&acct("alice")), Amount::new(100));
        book.debit(&acct("alice"), Amount::new(40)).unwrap();
        assert_eq!(book.balance(&acct("alice")), Amount::new(60));
    }

    #[test]
    fn transfer_credits_recipient() {
        let mut book = AccountBook::new();
        book.transfer(&acct("charity"), Amount::new(5)).unwrap();
        assert_eq!(book.balance(&acct("charity")), Amount::new(5));
        assert_eq!(book.balance(&acct("nobody")), Amount::ZERO);
    }

    #[test]
    fn credit_overflow_reported() {
        let mut book = AccountBook::new();
        book.credit(&acct("a"), Amount::new(u128::MAX)).unwrap();
        assert_eq!(
            book.credit(&acct("a"), Amount::new(1)),
            Err(TransferError::Overflow)
        );
    }
}
