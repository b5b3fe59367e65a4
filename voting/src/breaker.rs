//! Ledger-wide circuit breaker and decommission switch.

use qvote_ledger::LedgerError;
use qvote_types::AccountId;
use serde::{Deserialize, Serialize};

/// Global emergency switch held by the ledger owner.
///
/// While `stopped`, poll creation, commits and reveals are refused and
/// emergency withdrawal opens. `decommissioned` is terminal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreaker {
    owner: AccountId,
    stopped: bool,
    decommissioned: bool,
}

impl CircuitBreaker {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            stopped: false,
            decommissioned: false,
        }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_decommissioned(&self) -> bool {
        self.decommissioned
    }

    pub fn ensure_owner(&self, caller: &AccountId) -> Result<(), LedgerError> {
        if *caller != self.owner {
            return Err(LedgerError::NotAuthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    pub fn ensure_live(&self) -> Result<(), LedgerError> {
        if self.decommissioned {
            return Err(LedgerError::Decommissioned);
        }
        Ok(())
    }

    pub fn ensure_running(&self) -> Result<(), LedgerError> {
        if self.stopped {
            return Err(LedgerError::CircuitBreakerTripped);
        }
        Ok(())
    }

    pub fn ensure_tripped(&self) -> Result<(), LedgerError> {
        if !self.stopped {
            return Err(LedgerError::CircuitBreakerNotTripped);
        }
        Ok(())
    }

    /// Flip the breaker. Returns the new `stopped` state.
    pub fn toggle(&mut self, caller: &AccountId) -> Result<bool, LedgerError> {
        self.ensure_live()?;
        self.ensure_owner(caller)?;
        self.stopped = !self.stopped;
        Ok(self.stopped)
    }

    pub fn decommission(&mut self, caller: &AccountId) -> Result<(), LedgerError> {
        self.ensure_live()?;
        self.ensure_owner(caller)?;
        self.decommissioned = true;
        Ok(())
    }
}
