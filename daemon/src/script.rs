//! Scripted replay: a TOML file of timed calls executed one at a time against
//! an in-memory ledger.
//!
//! ```toml
//! [accounts]
//! alice = 1000
//!
//! [[step]]
//! at = 1700000000
//! caller = "admin"
//! op = "create_poll"
//! start_commit = 1700000100
//! start_reveal = 1700000200
//! first_vote_cost = 10
//! description = "lunch"
//! charity = "food-bank"
//! ```

use qvote_ledger::ErrorCategory;
use qvote_types::{AccountId, Amount, LedgerParams, Timestamp};
use qvote_voting::{AccountBook, Call, LedgerEvent, Outcome, QuadraticVoting};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid script: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("step {index} at {at} is earlier than the previous step")]
    OutOfOrder { index: usize, at: Timestamp },

    #[error("cannot fund {account}: {reason}")]
    Funding { account: AccountId, reason: String },

    #[error("step {index} ({op}): {detail}")]
    Expectation {
        index: usize,
        op: &'static str,
        detail: String,
    },
}

/// One timed call.
#[derive(Clone, Debug, Deserialize)]
pub struct Step {
    pub at: Timestamp,
    /// The step is expected to be rejected; a success fails the replay.
    #[serde(default)]
    pub expect_rejection: bool,
    #[serde(flatten)]
    pub call: Call,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Script {
    /// Starting balances of the accounts that attach payments.
    #[serde(default)]
    pub accounts: BTreeMap<AccountId, Amount>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_toml_file(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ScriptError> {
        Ok(toml::from_str(s)?)
    }
}

/// Summary of a finished replay.
#[derive(Clone, Debug, Serialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub rejected: usize,
    pub events: usize,
    /// Funds still held by the ledger.
    pub ledger_balance: Amount,
    pub accounts: BTreeMap<AccountId, Amount>,
    pub outcomes: Vec<StepResult>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum StepResult {
    Applied { outcome: Outcome },
    Rejected { error: String },
}

fn category_name(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::Validation => "validation",
        ErrorCategory::Authorization => "authorization",
        ErrorCategory::Phase => "phase",
        ErrorCategory::Integrity => "integrity",
        ErrorCategory::Resource => "resource",
        ErrorCategory::Operational => "operational",
    }
}

/// Run `script` to completion.
///
/// Payments are taken from the caller's account before dispatch and given
/// back if the call is rejected, the way an execution environment reverts a
/// failed call.
pub fn replay(
    script: Script,
    owner: AccountId,
    params: LedgerParams,
) -> Result<ReplayReport, ScriptError> {
    let mut book = AccountBook::new();
    for (account, amount) in &script.accounts {
        book.credit(account, *amount)
            .map_err(|err| ScriptError::Funding {
                account: account.clone(),
                reason: err.to_string(),
            })?;
    }

    let mut vm = QuadraticVoting::new(owner, params, book);
    let emitted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&emitted);
    vm.subscribe(Box::new(move |event: &LedgerEvent| {
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::info!(event = event.kind(), poll_id = %event.poll_id(), "ledger event");
    }));

    let mut applied = 0;
    let mut rejected = 0;
    let mut outcomes = Vec::with_capacity(script.steps.len());
    let mut last = Timestamp::EPOCH;

    for (index, step) in script.steps.into_iter().enumerate() {
        if step.at < last {
            return Err(ScriptError::OutOfOrder { index, at: step.at });
        }
        last = step.at;
        let op = step.call.operation.name();
        let caller = step.call.caller.clone();
        let payment = step.call.payment;

        let result = match vm.treasury_mut().debit(&caller, payment) {
            Err(err) => Err(err.to_string()),
            Ok(()) => match vm.dispatch(step.call, step.at) {
                Ok(outcome) => Ok(outcome),
                Err(err) => {
                    vm.treasury_mut()
                        .credit(&caller, payment)
                        .map_err(|refund| ScriptError::Funding {
                            account: caller.clone(),
                            reason: refund.to_string(),
                        })?;
                    tracing::warn!(
                        step = index,
                        op,
                        category = category_name(err.category()),
                        error = %err,
                        "call rejected"
                    );
                    Err(err.to_string())
                }
            },
        };

        match (result, step.expect_rejection) {
            (Ok(outcome), false) => {
                applied += 1;
                outcomes.push(StepResult::Applied { outcome });
            }
            (Err(error), true) => {
                rejected += 1;
                outcomes.push(StepResult::Rejected { error });
            }
            (Ok(outcome), true) => {
                return Err(ScriptError::Expectation {
                    index,
                    op,
                    detail: format!("expected rejection, got {outcome:?}"),
                });
            }
            (Err(error), false) => {
                return Err(ScriptError::Expectation {
                    index,
                    op,
                    detail: format!("unexpected rejection: {error}"),
                });
            }
        }
    }

    let accounts = vm
        .treasury()
        .accounts()
        .map(|(account, amount)| (account.clone(), *amount))
        .collect();
    Ok(ReplayReport {
        applied,
        rejected,
        events: emitted.load(Ordering::Relaxed),
        ledger_balance: vm.balance(),
        accounts,
        outcomes,
    })
}
