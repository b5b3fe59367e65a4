//! Nullable treasury: records transfers instead of moving funds.

use qvote_types::{AccountId, Amount};
use qvote_voting::{TransferError, Treasury};
use std::collections::HashSet;

/// A transfer primitive for tests.
///
/// Every successful transfer is appended to an in-memory log. It can be
/// armed to fail the next transfer or every transfer to given accounts.
#[derive(Clone, Debug, Default)]
pub struct NullTreasury {
    transfers: Vec<(AccountId, Amount)>,
    fail_next: bool,
    rejecting: HashSet<AccountId>,
}

impl NullTreasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail exactly one upcoming transfer.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    /// Refuse every transfer to `account` until [`Self::accept`] is called.
    pub fn reject(&mut self, account: AccountId) {
        self.rejecting.insert(account);
    }

    pub fn accept(&mut self, account: &AccountId) {
        self.rejecting.remove(account);
    }

    /// Successful transfers, oldest first.
    pub fn transfers(&self) -> &[(AccountId, Amount)] {
        &self.transfers
    }

    /// Total successfully sent to `account`.
    pub fn received(&self, account: &AccountId) -> Amount {
        self.transfers
            .iter()
            .filter(|(to, _)| to == account)
            .fold(Amount::ZERO, |acc, (_, amount)| acc + *amount)
    }

    pub fn total_sent(&self) -> Amount {
        self.transfers
            .iter()
            .fold(Amount::ZERO, |acc, (_, amount)| acc + *amount)
    }
}

impl Treasury for NullTreasury {
    fn transfer(&mut self, to: &AccountId, amount: Amount) -> Result<(), TransferError> {
        if std::mem::take(&mut self.fail_next) || self.rejecting.contains(to) {
            return Err(TransferError::Rejected(to.clone()));
        }
        self.transfers.push((to.clone(), amount));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(name: &str) -> AccountId {
        AccountId::new(name).unwrap()
    }

    #[test]
    fn records_successful_transfers() {
        let mut treasury = NullTreasury::new();
        treasury.transfer(&acct("a"), Amount::new(5)).unwrap();
        treasury.transfer(&acct("b"), Amount::new(7)).unwrap();
        treasury.transfer(&acct("a"), Amount::new(1)).unwrap();
        assert_eq!(treasury.received(&acct("a")), Amount::new(6));
        assert_eq!(treasury.total_sent(), Amount::new(13));
    }

    #[test]
    fn fail_next_fails_once() {
        let mut treasury = NullTreasury::new();
        treasury.fail_next();
        assert!(treasury.transfer(&acct("a"), Amount::new(5)).is_err());
        assert!(treasury.transfer(&acct("a"), Amount::new(5)).is_ok());
        assert_eq!(treasury.transfers().len(), 1);
    }

    #[test]
    fn rejecting_account_blocks_until_accepted() {
        let mut treasury = NullTreasury::new();
        treasury.reject(acct("charity"));
        assert_eq!(
            treasury.transfer(&acct("charity"), Amount::new(1)),
            Err(TransferError::Rejected(acct("charity")))
        );
        treasury.accept(&acct("charity"));
        assert!(treasury.transfer(&acct("charity"), Amount::new(1)).is_ok());
    }
}
