//! Poll, candidate and commitment records.

use crate::error::LedgerError;
use crate::phase::PhaseSchedule;
use qvote_types::{AccountId, Amount, CandidateId, CommitHash, Phase, PollId, ShortText, Timestamp};
use serde::{Deserialize, Serialize};

/// A poll and its running totals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub admin: AccountId,
    /// Receives the remaining funds on completion.
    pub charity: AccountId,
    pub description: ShortText,
    pub schedule: PhaseSchedule,
    /// Cost of the first vote; `n` votes cost `n² × first_vote_cost`.
    pub first_vote_cost: Amount,
    /// Last phase written by an operation. Lags the clock until the next call.
    pub phase: Phase,
    pub total_paid: Amount,
    pub total_refunded: Amount,
    /// Paid to the charity on completion.
    pub total_donated: Amount,
    pub total_votes_committed: u64,
    pub candidate_count: u8,
}

impl Poll {
    /// Funds still held for this poll.
    ///
    /// Fails if refunds and donation together exceed what was paid in.
    pub fn remaining_funds(&self) -> Result<Amount, LedgerError> {
        self.total_paid
            .checked_sub(self.total_refunded)
            .and_then(|left| left.checked_sub(self.total_donated))
            .ok_or(LedgerError::ArithmeticOverflow("poll remaining funds"))
    }

    pub fn end_reveal(&self) -> Timestamp {
        self.schedule.end_reveal()
    }

    pub fn is_completed(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Whether `candidate_id` names a registered candidate.
    pub fn has_candidate(&self, candidate_id: CandidateId) -> bool {
        !candidate_id.is_tie() && candidate_id.get() <= self.candidate_count
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: ShortText,
    pub vote_count: u64,
}

/// A voter's sealed vote in one poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub hash: CommitHash,
    pub num_votes: u64,
    /// Amount deposited when committing.
    pub paid: Amount,
    pub revealed: bool,
    /// Set once the voter has been refunded through an emergency withdrawal.
    pub withdrawn: bool,
}

impl Commitment {
    pub fn sealed(hash: CommitHash, num_votes: u64, paid: Amount) -> Self {
        Self {
            hash,
            num_votes,
            paid,
            revealed: false,
            withdrawn: false,
        }
    }
}

/// Arguments for [`crate::PollLedger::create_poll`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPoll {
    pub creator: AccountId,
    pub start_commit: Timestamp,
    pub start_reveal: Timestamp,
    pub first_vote_cost: Amount,
    pub description: Vec<u8>,
    pub charity: AccountId,
}
