//! The poll ledger: keyed storage for polls, candidates, commitments and
//! voter approvals.

use crate::error::LedgerError;
use crate::phase::{derive_phase, ClockPhase, PhaseSchedule};
use crate::poll::{Candidate, Commitment, NewPoll, Poll};
use qvote_types::{
    AccountId, Amount, CandidateId, LedgerParams, Phase, PollId, ShortText, Timestamp,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// In-memory store of every poll and its dependent records.
///
/// Polls are kept ordered by id so listings come out in creation order.
/// Nothing is ever deleted.
#[derive(Clone, Debug)]
pub struct PollLedger {
    params: LedgerParams,
    next_poll_id: PollId,
    polls: BTreeMap<PollId, Poll>,
    candidates: HashMap<(PollId, CandidateId), Candidate>,
    commitments: HashMap<(PollId, AccountId), Commitment>,
    approvals: HashSet<(PollId, AccountId)>,
}

impl Default for PollLedger {
    fn default() -> Self {
        Self::new(LedgerParams::default())
    }
}

impl PollLedger {
    pub fn new(params: LedgerParams) -> Self {
        Self {
            params,
            next_poll_id: PollId::FIRST,
            polls: BTreeMap::new(),
            candidates: HashMap::new(),
            commitments: HashMap::new(),
            approvals: HashSet::new(),
        }
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    /// Register a new poll with its creator as admin.
    ///
    /// The poll starts in [`Phase::Created`] with zeroed totals and no
    /// candidates. Ids are assigned sequentially from 1.
    pub fn create_poll(&mut self, new: NewPoll, now: Timestamp) -> Result<PollId, LedgerError> {
        let schedule = PhaseSchedule::new(
            new.start_commit,
            new.start_reveal,
            now,
            self.params.max_schedule_secs,
        )?;
        if new.first_vote_cost.is_zero() {
            return Err(LedgerError::InvalidCost);
        }
        let description = ShortText::new(new.description, self.params.max_description_len)?;
        let id = self.next_poll_id;
        let next = id
            .checked_next()
            .ok_or(LedgerError::ArithmeticOverflow("poll id"))?;

        let poll = Poll {
            id,
            admin: new.creator,
            charity: new.charity,
            description,
            schedule,
            first_vote_cost: new.first_vote_cost,
            phase: Phase::Created,
            total_paid: Amount::ZERO,
            total_refunded: Amount::ZERO,
            total_donated: Amount::ZERO,
            total_votes_committed: 0,
            candidate_count: 0,
        };
        self.polls.insert(id, poll);
        self.next_poll_id = next;
        tracing::debug!(poll_id = %id, "poll registered");
        Ok(id)
    }

    /// Append a candidate, assigning it the next index.
    ///
    /// Fails with [`LedgerError::CandidateLimitExceeded`] once 255 candidates
    /// exist; the count never wraps.
    pub fn add_candidate(
        &mut self,
        poll_id: PollId,
        name: Vec<u8>,
    ) -> Result<CandidateId, LedgerError> {
        let max_len = self.params.max_candidate_name_len;
        let poll = self.poll_mut(poll_id)?;
        let id = CandidateId::new(poll.candidate_count)
            .checked_next()
            .ok_or(LedgerError::CandidateLimitExceeded(poll_id))?;
        let name = ShortText::new(name, max_len)?;
        poll.candidate_count = id.get();
        self.candidates.insert(
            (poll_id, id),
            Candidate {
                id,
                name,
                vote_count: 0,
            },
        );
        Ok(id)
    }

    pub fn poll(&self, poll_id: PollId) -> Result<&Poll, LedgerError> {
        self.polls
            .get(&poll_id)
            .ok_or(LedgerError::PollNotFound(poll_id))
    }

    pub fn poll_mut(&mut self, poll_id: PollId) -> Result<&mut Poll, LedgerError> {
        self.polls
            .get_mut(&poll_id)
            .ok_or(LedgerError::PollNotFound(poll_id))
    }

    pub fn candidate(
        &self,
        poll_id: PollId,
        candidate_id: CandidateId,
    ) -> Result<&Candidate, LedgerError> {
        self.candidates
            .get(&(poll_id, candidate_id))
            .ok_or(LedgerError::NoSuchCandidate {
                poll_id,
                candidate_id,
            })
    }

    pub fn candidate_mut(
        &mut self,
        poll_id: PollId,
        candidate_id: CandidateId,
    ) -> Result<&mut Candidate, LedgerError> {
        self.candidates
            .get_mut(&(poll_id, candidate_id))
            .ok_or(LedgerError::NoSuchCandidate {
                poll_id,
                candidate_id,
            })
    }

    /// Candidates of a poll in index order.
    pub fn candidates(&self, poll_id: PollId) -> Result<Vec<&Candidate>, LedgerError> {
        let poll = self.poll(poll_id)?;
        Ok((1..=poll.candidate_count)
            .filter_map(|raw| self.candidates.get(&(poll_id, CandidateId::new(raw))))
            .collect())
    }

    pub fn commitment(&self, poll_id: PollId, voter: &AccountId) -> Option<&Commitment> {
        self.commitments.get(&(poll_id, voter.clone()))
    }

    pub fn commitment_mut(
        &mut self,
        poll_id: PollId,
        voter: &AccountId,
    ) -> Result<&mut Commitment, LedgerError> {
        self.commitments
            .get_mut(&(poll_id, voter.clone()))
            .ok_or_else(|| LedgerError::NoSuchCommitment {
                poll_id,
                voter: voter.clone(),
            })
    }

    /// Store a new commitment. A voter commits at most once per poll.
    pub fn insert_commitment(
        &mut self,
        poll_id: PollId,
        voter: &AccountId,
        commitment: Commitment,
    ) -> Result<(), LedgerError> {
        let key = (poll_id, voter.clone());
        if self.commitments.contains_key(&key) {
            return Err(LedgerError::AlreadyCommitted {
                poll_id,
                voter: voter.clone(),
            });
        }
        self.commitments.insert(key, commitment);
        Ok(())
    }

    /// Record `voter` as approved. Returns `false` if already approved.
    pub fn approve(&mut self, poll_id: PollId, voter: AccountId) -> bool {
        self.approvals.insert((poll_id, voter))
    }

    /// Revoke an approval. Returns `false` if there was none.
    pub fn remove_approval(&mut self, poll_id: PollId, voter: &AccountId) -> bool {
        self.approvals.remove(&(poll_id, voter.clone()))
    }

    pub fn is_approved_voter(&self, poll_id: PollId, voter: &AccountId) -> bool {
        self.approvals.contains(&(poll_id, voter.clone()))
    }

    /// Ids of polls currently administered by `account`, ascending.
    pub fn polls_administered_by(&self, account: &AccountId) -> Vec<PollId> {
        self.polls
            .values()
            .filter(|poll| poll.admin == *account)
            .map(|poll| poll.id)
            .collect()
    }

    /// Ids of polls `voter` is approved for, ascending.
    pub fn polls_approved_for(&self, voter: &AccountId) -> Vec<PollId> {
        let mut ids: Vec<PollId> = self
            .approvals
            .iter()
            .filter(|(_, approved)| approved == voter)
            .map(|(poll_id, _)| *poll_id)
            .collect();
        ids.sort();
        ids
    }

    pub fn poll_count(&self) -> usize {
        self.polls.len()
    }

    pub fn polls(&self) -> impl Iterator<Item = &Poll> {
        self.polls.values()
    }

    /// Sum of all funds still held across polls. `None` on overflow or if
    /// any poll is overdrawn.
    pub fn total_held(&self) -> Option<Amount> {
        self.polls
            .values()
            .try_fold(Amount::ZERO, |acc, poll| {
                acc.checked_add(poll.remaining_funds().ok()?)
            })
    }

    /// Bring the stored phase of `poll_id` up to date with the clock.
    ///
    /// The stored phase only moves forward and never becomes `Completed`
    /// here. Returns the clock reading so callers can tell a finished reveal
    /// window apart from an open one.
    pub fn advance_phase(
        &mut self,
        poll_id: PollId,
        now: Timestamp,
    ) -> Result<ClockPhase, LedgerError> {
        let poll = self.poll_mut(poll_id)?;
        let reading = derive_phase(now, &poll.schedule);
        if poll.is_completed() {
            return Ok(reading);
        }
        let target = reading.stored_phase();
        if target > poll.phase {
            tracing::debug!(
                poll_id = %poll_id,
                from = %poll.phase,
                to = %target,
                "poll phase advanced"
            );
            poll.phase = target;
        }
        Ok(reading)
    }

    /// Check the per-poll accounting invariants.
    ///
    /// Refunds plus donation never exceed what a poll was paid, and the
    /// committed vote total covers every candidate tally.
    pub fn check_invariants(&self) -> Result<(), String> {
        for poll in self.polls.values() {
            let paid_out = poll
                .total_refunded
                .checked_add(poll.total_donated)
                .ok_or_else(|| format!("poll {}: payout overflow", poll.id))?;
            if paid_out > poll.total_paid {
                return Err(format!(
                    "poll {}: paid out {} exceeds paid {}",
                    poll.id, paid_out, poll.total_paid
                ));
            }
            let tallied = self
                .candidates(poll.id)
                .map_err(|e| e.to_string())?
                .iter()
                .try_fold(0u64, |acc, c| acc.checked_add(c.vote_count))
                .ok_or_else(|| format!("poll {}: tally overflow", poll.id))?;
            if tallied > poll.total_votes_committed {
                return Err(format!(
                    "poll {}: {} votes tallied but only {} committed",
                    poll.id, tallied, poll.total_votes_committed
                ));
            }
        }
        Ok(())
    }
}
