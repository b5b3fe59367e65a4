//! Operation envelope and dispatcher.
//!
//! Hosts deliver `(caller, payment, operation)` triples one at a time; the
//! dispatcher routes each to the matching [`QuadraticVoting`] method inside
//! its own tracing span.

use crate::event::CompletionRecord;
use crate::machine::QuadraticVoting;
use crate::treasury::Treasury;
use qvote_ledger::{LedgerError, NewPoll};
use qvote_types::{AccountId, Amount, CandidateId, CommitHash, PollId, Salt, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{info_span, Span};

/// Every externally callable mutating operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    CreatePoll {
        start_commit: Timestamp,
        start_reveal: Timestamp,
        first_vote_cost: Amount,
        description: String,
        charity: AccountId,
    },
    AddCandidate {
        poll_id: PollId,
        name: String,
    },
    ApproveVoter {
        poll_id: PollId,
        voter: AccountId,
    },
    RemoveVoter {
        poll_id: PollId,
        voter: AccountId,
    },
    TransferAdmin {
        poll_id: PollId,
        new_admin: AccountId,
    },
    CommitVote {
        poll_id: PollId,
        hash: CommitHash,
        num_votes: u64,
    },
    RevealVote {
        poll_id: PollId,
        candidate_id: CandidateId,
        salt: Salt,
    },
    Withdraw {
        poll_id: PollId,
        candidate_id: CandidateId,
        salt: Salt,
    },
    CompletePoll {
        poll_id: PollId,
    },
    ToggleActive,
    SweepBalance,
    Kill,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreatePoll { .. } => "create_poll",
            Self::AddCandidate { .. } => "add_candidate",
            Self::ApproveVoter { .. } => "approve_voter",
            Self::RemoveVoter { .. } => "remove_voter",
            Self::TransferAdmin { .. } => "transfer_admin",
            Self::CommitVote { .. } => "commit_vote",
            Self::RevealVote { .. } => "reveal_vote",
            Self::Withdraw { .. } => "withdraw",
            Self::CompletePoll { .. } => "complete_poll",
            Self::ToggleActive => "toggle_active",
            Self::SweepBalance => "sweep_balance",
            Self::Kill => "kill",
        }
    }

    /// Only commits carry a deposit.
    pub fn accepts_payment(&self) -> bool {
        matches!(self, Self::CommitVote { .. })
    }

    pub fn poll_id(&self) -> Option<PollId> {
        match self {
            Self::AddCandidate { poll_id, .. }
            | Self::ApproveVoter { poll_id, .. }
            | Self::RemoveVoter { poll_id, .. }
            | Self::TransferAdmin { poll_id, .. }
            | Self::CommitVote { poll_id, .. }
            | Self::RevealVote { poll_id, .. }
            | Self::Withdraw { poll_id, .. }
            | Self::CompletePoll { poll_id } => Some(*poll_id),
            Self::CreatePoll { .. } | Self::ToggleActive | Self::SweepBalance | Self::Kill => None,
        }
    }
}

/// One delivered call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub caller: AccountId,
    #[serde(default)]
    pub payment: Amount,
    #[serde(flatten)]
    pub operation: Operation,
}

/// What a successful call produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    PollCreated { poll_id: PollId },
    CandidateAdded { candidate_id: CandidateId },
    Done,
    Refunded { amount: Amount },
    Completed(CompletionRecord),
    BreakerToggled { stopped: bool },
    Swept { amount: Amount },
}

/// Span wrapping a single dispatched operation.
pub fn operation_span(op: &Operation, caller: &AccountId) -> Span {
    match op.poll_id() {
        Some(poll_id) => info_span!("op", operation = op.name(), caller = %caller, poll_id = %poll_id),
        None => info_span!("op", operation = op.name(), caller = %caller),
    }
}

impl<T: Treasury> QuadraticVoting<T> {
    /// Route `call` to its operation.
    ///
    /// A payment attached to anything but a commit is refused before the
    /// operation runs.
    pub fn dispatch(&mut self, call: Call, now: Timestamp) -> Result<Outcome, LedgerError> {
        let span = operation_span(&call.operation, &call.caller);
        let _enter = span.enter();

        if !call.payment.is_zero() && !call.operation.accepts_payment() {
            return Err(LedgerError::UnexpectedPayment(call.payment));
        }
        let caller = call.caller;
        let outcome = match call.operation {
            Operation::CreatePoll {
                start_commit,
                start_reveal,
                first_vote_cost,
                description,
                charity,
            } => {
                let poll_id = self.create_poll(
                    NewPoll {
                        creator: caller,
                        start_commit,
                        start_reveal,
                        first_vote_cost,
                        description: description.into_bytes(),
                        charity,
                    },
                    now,
                )?;
                Outcome::PollCreated { poll_id }
            }
            Operation::AddCandidate { poll_id, name } => {
                let candidate_id = self.add_candidate(&caller, poll_id, name.into_bytes(), now)?;
                Outcome::CandidateAdded { candidate_id }
            }
            Operation::ApproveVoter { poll_id, voter } => {
                self.approve_voter(&caller, poll_id, voter, now)?;
                Outcome::Done
            }
            Operation::RemoveVoter { poll_id, voter } => {
                self.remove_voter(&caller, poll_id, voter, now)?;
                Outcome::Done
            }
            Operation::TransferAdmin { poll_id, new_admin } => {
                self.transfer_admin(&caller, poll_id, new_admin, now)?;
                Outcome::Done
            }
            Operation::CommitVote {
                poll_id,
                hash,
                num_votes,
            } => {
                self.commit_vote(&caller, poll_id, hash, num_votes, call.payment, now)?;
                Outcome::Done
            }
            Operation::RevealVote {
                poll_id,
                candidate_id,
                salt,
            } => {
                let amount = self.reveal_vote(&caller, poll_id, candidate_id, &salt, now)?;
                Outcome::Refunded { amount }
            }
            Operation::Withdraw {
                poll_id,
                candidate_id,
                salt,
            } => {
                let amount = self.withdraw(&caller, poll_id, candidate_id, &salt, now)?;
                Outcome::Refunded { amount }
            }
            Operation::CompletePoll { poll_id } => {
                Outcome::Completed(self.complete_poll(poll_id, now)?)
            }
            Operation::ToggleActive => Outcome::BreakerToggled {
                stopped: self.toggle_active(&caller)?,
            },
            Operation::SweepBalance => Outcome::Swept {
                amount: self.sweep_balance(&caller)?,
            },
            Operation::Kill => Outcome::Swept {
                amount: self.kill(&caller)?,
            },
        };
        Ok(outcome)
    }
}
