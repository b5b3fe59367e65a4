//! The voting state machine.
//!
//! Every mutating operation follows the same shape:
//!
//! 1. refuse everything once the ledger is decommissioned;
//! 2. advance the poll's stored phase to match `now` (kept even on rejection);
//! 3. check the circuit breaker, the caller's capability and the phase gate;
//! 4. validate arguments against the stored records;
//! 5. write the new state, then move funds. A failed transfer restores every
//!    record the operation touched.

use crate::breaker::CircuitBreaker;
use crate::event::{CompletionRecord, EventBus, LedgerEvent};
use crate::payout::{charity_remainder, quote_refund, record_refund};
use crate::treasury::Treasury;
use qvote_crypto::verify_commitment;
use qvote_ledger::{
    derive_phase, quadratic_cost, Candidate, ClockPhase, Commitment, LedgerError, NewPoll, Poll,
    PollLedger,
};
use qvote_types::{
    AccountId, Amount, CandidateId, CommitHash, LedgerParams, Phase, PollId, Salt, Timestamp,
};

/// Copies of the records an operation is about to change.
struct Snapshot {
    poll: Poll,
    candidate: Option<Candidate>,
    commitment: Option<(AccountId, Commitment)>,
}

impl Snapshot {
    fn take(
        ledger: &PollLedger,
        poll_id: PollId,
        candidate_id: Option<CandidateId>,
        voter: Option<&AccountId>,
    ) -> Result<Self, LedgerError> {
        let poll = ledger.poll(poll_id)?.clone();
        let candidate = match candidate_id {
            Some(id) => Some(ledger.candidate(poll_id, id)?.clone()),
            None => None,
        };
        let commitment = voter.and_then(|voter| {
            ledger
                .commitment(poll_id, voter)
                .map(|c| (voter.clone(), c.clone()))
        });
        Ok(Self {
            poll,
            candidate,
            commitment,
        })
    }

    fn restore(self, ledger: &mut PollLedger) {
        let poll_id = self.poll.id;
        if let Ok(poll) = ledger.poll_mut(poll_id) {
            *poll = self.poll;
        }
        if let Some(candidate) = self.candidate {
            if let Ok(slot) = ledger.candidate_mut(poll_id, candidate.id) {
                *slot = candidate;
            }
        }
        if let Some((voter, commitment)) = self.commitment {
            if let Ok(slot) = ledger.commitment_mut(poll_id, &voter) {
                *slot = commitment;
            }
        }
    }
}

/// Commit-reveal quadratic voting over a [`PollLedger`].
///
/// Holds every deposit in custody (`balance`) and pays out through `T`.
/// Mutators take `&mut self`; a host serializes calls however it likes.
pub struct QuadraticVoting<T: Treasury> {
    ledger: PollLedger,
    breaker: CircuitBreaker,
    balance: Amount,
    treasury: T,
    events: EventBus,
}

impl<T: Treasury> QuadraticVoting<T> {
    pub fn new(owner: AccountId, params: LedgerParams, treasury: T) -> Self {
        Self {
            ledger: PollLedger::new(params),
            breaker: CircuitBreaker::new(owner),
            balance: Amount::ZERO,
            treasury,
            events: EventBus::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.events.subscribe(listener);
    }

    // ── Poll administration ─────────────────────────────────────────────

    /// Register a poll with `poll.creator` as its admin.
    pub fn create_poll(&mut self, poll: NewPoll, now: Timestamp) -> Result<PollId, LedgerError> {
        self.breaker.ensure_live()?;
        self.breaker.ensure_running()?;
        let creator = poll.creator.clone();
        let poll_id = self.ledger.create_poll(poll, now)?;
        let created = self.ledger.poll(poll_id)?;
        tracing::info!(
            poll_id = %poll_id,
            creator = %creator,
            start_commit = %created.schedule.start_commit(),
            end_reveal = %created.end_reveal(),
            "poll created"
        );
        let event = LedgerEvent::PollCreated {
            poll_id,
            creator,
            description: created.description.clone(),
            start_commit: created.schedule.start_commit(),
            end_reveal: created.end_reveal(),
        };
        self.events.emit(&event);
        Ok(poll_id)
    }

    /// Append a candidate. Admin only, while the poll is `Created` or `Commit`.
    pub fn add_candidate(
        &mut self,
        caller: &AccountId,
        poll_id: PollId,
        name: Vec<u8>,
        now: Timestamp,
    ) -> Result<CandidateId, LedgerError> {
        self.breaker.ensure_live()?;
        self.ledger.advance_phase(poll_id, now)?;
        let poll = self.admin_poll(caller, poll_id)?;
        if !poll.phase.accepts_candidates() {
            return Err(LedgerError::WrongPhase {
                poll_id,
                phase: poll.phase,
            });
        }
        let candidate_id = self.ledger.add_candidate(poll_id, name)?;
        tracing::info!(poll_id = %poll_id, candidate_id = %candidate_id, "candidate added");
        Ok(candidate_id)
    }

    pub fn approve_voter(
        &mut self,
        caller: &AccountId,
        poll_id: PollId,
        voter: AccountId,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.breaker.ensure_live()?;
        self.ledger.advance_phase(poll_id, now)?;
        let poll = self.admin_poll(caller, poll_id)?;
        let event = LedgerEvent::VoterApproved {
            poll_id,
            voter: voter.clone(),
            description: poll.description.clone(),
            start_commit: poll.schedule.start_commit(),
            end_reveal: poll.end_reveal(),
        };
        if !self.ledger.approve(poll_id, voter.clone()) {
            tracing::debug!(poll_id = %poll_id, voter = %voter, "voter was already approved");
        }
        tracing::info!(poll_id = %poll_id, voter = %voter, "voter approved");
        self.events.emit(&event);
        Ok(())
    }

    pub fn remove_voter(
        &mut self,
        caller: &AccountId,
        poll_id: PollId,
        voter: AccountId,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.breaker.ensure_live()?;
        self.ledger.advance_phase(poll_id, now)?;
        self.admin_poll(caller, poll_id)?;
        if !self.ledger.remove_approval(poll_id, &voter) {
            tracing::debug!(poll_id = %poll_id, voter = %voter, "voter was not approved");
        }
        tracing::info!(poll_id = %poll_id, voter = %voter, "voter removed");
        self.events.emit(&LedgerEvent::VoterRemoved { poll_id, voter });
        Ok(())
    }

    pub fn transfer_admin(
        &mut self,
        caller: &AccountId,
        poll_id: PollId,
        new_admin: AccountId,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.breaker.ensure_live()?;
        self.ledger.advance_phase(poll_id, now)?;
        self.admin_poll(caller, poll_id)?;
        let poll = self.ledger.poll_mut(poll_id)?;
        let former_admin = std::mem::replace(&mut poll.admin, new_admin.clone());
        let event = LedgerEvent::AdminTransferred {
            poll_id,
            former_admin: former_admin.clone(),
            new_admin: new_admin.clone(),
            description: poll.description.clone(),
            start_commit: poll.schedule.start_commit(),
            end_reveal: poll.end_reveal(),
        };
        tracing::info!(
            poll_id = %poll_id,
            former_admin = %former_admin,
            new_admin = %new_admin,
            "admin transferred"
        );
        self.events.emit(&event);
        Ok(())
    }

    // ── Voting ──────────────────────────────────────────────────────────

    /// Seal `num_votes` votes behind `hash`, depositing exactly
    /// `num_votes² × first_vote_cost`.
    pub fn commit_vote(
        &mut self,
        voter: &AccountId,
        poll_id: PollId,
        hash: CommitHash,
        num_votes: u64,
        payment: Amount,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.breaker.ensure_live()?;
        self.ledger.advance_phase(poll_id, now)?;
        self.breaker.ensure_running()?;

        let poll = self.ledger.poll(poll_id)?;
        if poll.phase != Phase::Commit {
            return Err(LedgerError::WrongPhase {
                poll_id,
                phase: poll.phase,
            });
        }
        if !self.ledger.is_approved_voter(poll_id, voter) {
            return Err(LedgerError::NotApprovedVoter {
                poll_id,
                voter: voter.clone(),
            });
        }
        if self.ledger.commitment(poll_id, voter).is_some() {
            return Err(LedgerError::AlreadyCommitted {
                poll_id,
                voter: voter.clone(),
            });
        }
        if num_votes == 0 {
            return Err(LedgerError::InsufficientVoteCount);
        }
        let expected = quadratic_cost(num_votes, poll.first_vote_cost)?;
        if payment != expected {
            return Err(LedgerError::IncorrectPayment {
                expected,
                received: payment,
            });
        }
        let total_paid = poll
            .total_paid
            .checked_add(payment)
            .ok_or(LedgerError::ArithmeticOverflow("total paid"))?;
        let total_votes = poll
            .total_votes_committed
            .checked_add(num_votes)
            .ok_or(LedgerError::ArithmeticOverflow("total votes committed"))?;
        let balance = self
            .balance
            .checked_add(payment)
            .ok_or(LedgerError::ArithmeticOverflow("ledger balance"))?;

        self.ledger
            .insert_commitment(poll_id, voter, Commitment::sealed(hash, num_votes, payment))?;
        let poll = self.ledger.poll_mut(poll_id)?;
        poll.total_paid = total_paid;
        poll.total_votes_committed = total_votes;
        self.balance = balance;
        tracing::info!(
            poll_id = %poll_id,
            voter = %voter,
            num_votes,
            paid = %payment,
            "vote committed"
        );
        Ok(())
    }

    /// Open a commitment, add its votes to the candidate and refund the
    /// voter's share of the pool. Returns the refund paid.
    pub fn reveal_vote(
        &mut self,
        voter: &AccountId,
        poll_id: PollId,
        candidate_id: CandidateId,
        salt: &Salt,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        self.breaker.ensure_live()?;
        let reading = self.ledger.advance_phase(poll_id, now)?;
        self.breaker.ensure_running()?;

        let poll = self.ledger.poll(poll_id)?;
        if reading != ClockPhase::Reveal || poll.is_completed() {
            return Err(LedgerError::WrongPhase {
                poll_id,
                phase: poll.phase,
            });
        }
        let num_votes = self.open_commitment(poll_id, voter, candidate_id, salt)?;
        let poll = self.ledger.poll(poll_id)?;
        if !poll.has_candidate(candidate_id) {
            return Err(LedgerError::NoSuchCandidate {
                poll_id,
                candidate_id,
            });
        }
        let quote = quote_refund(poll, num_votes)?;
        if quote.capped {
            tracing::warn!(poll_id = %poll_id, voter = %voter, refund = %quote.amount, "refund capped at remaining funds");
        }

        self.settle(poll_id, Some(candidate_id), voter, quote.amount, |ledger| {
            let candidate = ledger.candidate_mut(poll_id, candidate_id)?;
            candidate.vote_count = candidate
                .vote_count
                .checked_add(num_votes)
                .ok_or(LedgerError::ArithmeticOverflow("vote count"))?;
            ledger.commitment_mut(poll_id, voter)?.revealed = true;
            record_refund(ledger.poll_mut(poll_id)?, quote.amount)
        })?;
        tracing::info!(
            poll_id = %poll_id,
            voter = %voter,
            candidate_id = %candidate_id,
            num_votes,
            refund = %quote.amount,
            "vote revealed"
        );
        Ok(quote.amount)
    }

    /// Emergency exit while the breaker is tripped: verify the commitment,
    /// refund as a reveal would, but leave every tally untouched.
    pub fn withdraw(
        &mut self,
        voter: &AccountId,
        poll_id: PollId,
        candidate_id: CandidateId,
        salt: &Salt,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        self.breaker.ensure_live()?;
        self.ledger.advance_phase(poll_id, now)?;
        self.breaker.ensure_tripped()?;

        let poll = self.ledger.poll(poll_id)?;
        if poll.is_completed() {
            return Err(LedgerError::WrongPhase {
                poll_id,
                phase: poll.phase,
            });
        }
        let num_votes = self.open_commitment(poll_id, voter, candidate_id, salt)?;
        let quote = quote_refund(self.ledger.poll(poll_id)?, num_votes)?;
        if quote.capped {
            tracing::warn!(poll_id = %poll_id, voter = %voter, refund = %quote.amount, "refund capped at remaining funds");
        }

        self.settle(poll_id, None, voter, quote.amount, |ledger| {
            let commitment = ledger.commitment_mut(poll_id, voter)?;
            commitment.revealed = true;
            commitment.withdrawn = true;
            record_refund(ledger.poll_mut(poll_id)?, quote.amount)
        })?;
        tracing::warn!(
            poll_id = %poll_id,
            voter = %voter,
            refund = %quote.amount,
            "emergency withdrawal"
        );
        Ok(quote.amount)
    }

    /// Finish a poll whose reveal window has closed: pick the winner and
    /// donate whatever was not refunded.
    pub fn complete_poll(
        &mut self,
        poll_id: PollId,
        now: Timestamp,
    ) -> Result<CompletionRecord, LedgerError> {
        self.breaker.ensure_live()?;
        let reading = self.ledger.advance_phase(poll_id, now)?;
        let poll = self.ledger.poll(poll_id)?;
        if poll.is_completed() {
            return Err(LedgerError::AlreadyCompleted(poll_id));
        }
        if reading != ClockPhase::RevealEnded {
            return Err(LedgerError::TooEarly {
                poll_id,
                end_reveal: poll.end_reveal(),
            });
        }

        let winner = self.winner(poll_id)?;
        let poll = self.ledger.poll(poll_id)?;
        let amount = charity_remainder(poll)?;
        let charity = poll.charity.clone();

        let snapshot = Snapshot::take(&self.ledger, poll_id, None, None)?;
        let poll = self.ledger.poll_mut(poll_id)?;
        poll.phase = Phase::Completed;
        poll.total_donated = amount;
        if let Err(err) = self.pay(&charity, amount) {
            tracing::error!(poll_id = %poll_id, charity = %charity, error = %err, "donation failed, completion rolled back");
            snapshot.restore(&mut self.ledger);
            return Err(err);
        }

        let record = CompletionRecord {
            poll_id,
            winner,
            amount_donated: amount,
        };
        tracing::info!(
            poll_id = %poll_id,
            winner = %winner,
            donated = %amount,
            "poll completed"
        );
        self.events.emit(&LedgerEvent::PollCompleted(record.clone()));
        Ok(record)
    }

    // ── Owner operations ────────────────────────────────────────────────

    /// Flip the circuit breaker. Returns whether the ledger is now stopped.
    pub fn toggle_active(&mut self, caller: &AccountId) -> Result<bool, LedgerError> {
        let stopped = self.breaker.toggle(caller)?;
        tracing::warn!(owner = %caller, stopped, "circuit breaker toggled");
        Ok(stopped)
    }

    /// Move the whole custody balance to the owner, regardless of any poll's
    /// outstanding refunds.
    pub fn sweep_balance(&mut self, caller: &AccountId) -> Result<Amount, LedgerError> {
        self.breaker.ensure_live()?;
        self.breaker.ensure_owner(caller)?;
        let amount = self.balance;
        self.pay(caller, amount)?;
        tracing::warn!(owner = %caller, amount = %amount, "balance swept");
        Ok(amount)
    }

    /// Sweep and decommission. Nothing mutates afterwards.
    pub fn kill(&mut self, caller: &AccountId) -> Result<Amount, LedgerError> {
        self.breaker.ensure_live()?;
        self.breaker.ensure_owner(caller)?;
        let amount = self.balance;
        self.pay(caller, amount)?;
        self.breaker.decommission(caller)?;
        tracing::warn!(owner = %caller, amount = %amount, "ledger decommissioned");
        Ok(amount)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn poll(&self, poll_id: PollId) -> Result<&Poll, LedgerError> {
        self.ledger.poll(poll_id)
    }

    pub fn candidate(
        &self,
        poll_id: PollId,
        candidate_id: CandidateId,
    ) -> Result<&Candidate, LedgerError> {
        self.ledger.candidate(poll_id, candidate_id)
    }

    pub fn candidates(&self, poll_id: PollId) -> Result<Vec<&Candidate>, LedgerError> {
        self.ledger.candidates(poll_id)
    }

    pub fn commitment(&self, poll_id: PollId, voter: &AccountId) -> Option<&Commitment> {
        self.ledger.commitment(poll_id, voter)
    }

    pub fn is_approved_voter(&self, poll_id: PollId, voter: &AccountId) -> bool {
        self.ledger.is_approved_voter(poll_id, voter)
    }

    /// The phase the poll would be in at `now`, without recording it.
    pub fn current_phase(&self, poll_id: PollId, now: Timestamp) -> Result<Phase, LedgerError> {
        let poll = self.ledger.poll(poll_id)?;
        if poll.is_completed() {
            return Ok(Phase::Completed);
        }
        Ok(derive_phase(now, &poll.schedule).stored_phase().max(poll.phase))
    }

    pub fn polls_administered_by(&self, account: &AccountId) -> Vec<PollId> {
        self.ledger.polls_administered_by(account)
    }

    pub fn polls_approved_for(&self, voter: &AccountId) -> Vec<PollId> {
        self.ledger.polls_approved_for(voter)
    }

    pub fn poll_count(&self) -> usize {
        self.ledger.poll_count()
    }

    /// Funds currently in custody.
    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn owner(&self) -> &AccountId {
        self.breaker.owner()
    }

    pub fn is_stopped(&self) -> bool {
        self.breaker.is_stopped()
    }

    pub fn is_decommissioned(&self) -> bool {
        self.breaker.is_decommissioned()
    }

    pub fn ledger(&self) -> &PollLedger {
        &self.ledger
    }

    pub fn treasury(&self) -> &T {
        &self.treasury
    }

    pub fn treasury_mut(&mut self) -> &mut T {
        &mut self.treasury
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn admin_poll(&self, caller: &AccountId, poll_id: PollId) -> Result<&Poll, LedgerError> {
        let poll = self.ledger.poll(poll_id)?;
        if poll.admin != *caller {
            return Err(LedgerError::NotAuthorized {
                caller: caller.clone(),
            });
        }
        Ok(poll)
    }

    /// Check that `voter` holds an unopened commitment matching the revealed
    /// tuple. Returns its vote count.
    fn open_commitment(
        &self,
        poll_id: PollId,
        voter: &AccountId,
        candidate_id: CandidateId,
        salt: &Salt,
    ) -> Result<u64, LedgerError> {
        let commitment =
            self.ledger
                .commitment(poll_id, voter)
                .ok_or_else(|| LedgerError::NoSuchCommitment {
                    poll_id,
                    voter: voter.clone(),
                })?;
        if commitment.withdrawn {
            return Err(LedgerError::AlreadyWithdrawn {
                poll_id,
                voter: voter.clone(),
            });
        }
        if commitment.revealed {
            return Err(LedgerError::AlreadyRevealed {
                poll_id,
                voter: voter.clone(),
            });
        }
        if !verify_commitment(
            &commitment.hash,
            poll_id,
            commitment.num_votes,
            candidate_id,
            salt,
        ) {
            return Err(LedgerError::HashMismatch);
        }
        Ok(commitment.num_votes)
    }

    /// Strictly greatest tally, or [`CandidateId::TIE`].
    fn winner(&self, poll_id: PollId) -> Result<CandidateId, LedgerError> {
        let mut winner = CandidateId::TIE;
        let mut best = 0u64;
        for candidate in self.ledger.candidates(poll_id)? {
            if candidate.vote_count > best {
                best = candidate.vote_count;
                winner = candidate.id;
            } else if candidate.vote_count == best {
                winner = CandidateId::TIE;
            }
        }
        Ok(winner)
    }

    /// Apply `mutate` to the ledger, then pay `amount` to `to`. Any failure
    /// restores the poll, the candidate and `to`'s commitment.
    fn settle<F>(
        &mut self,
        poll_id: PollId,
        candidate_id: Option<CandidateId>,
        to: &AccountId,
        amount: Amount,
        mutate: F,
    ) -> Result<(), LedgerError>
    where
        F: FnOnce(&mut PollLedger) -> Result<(), LedgerError>,
    {
        let snapshot = Snapshot::take(&self.ledger, poll_id, candidate_id, Some(to))?;
        if let Err(err) = mutate(&mut self.ledger) {
            snapshot.restore(&mut self.ledger);
            return Err(err);
        }
        if let Err(err) = self.pay(to, amount) {
            tracing::error!(poll_id = %poll_id, to = %to, amount = %amount, error = %err, "payout failed, operation rolled back");
            snapshot.restore(&mut self.ledger);
            return Err(err);
        }
        Ok(())
    }

    /// Transfer out of custody. Zero amounts are not sent.
    fn pay(&mut self, to: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Ok(());
        }
        let remaining =
            self.balance
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientBalance {
                    needed: amount,
                    available: self.balance,
                })?;
        self.treasury
            .transfer(to, amount)
            .map_err(|err| LedgerError::TransferFailed {
                to: to.clone(),
                amount,
                reason: err.to_string(),
            })?;
        self.balance = remaining;
        Ok(())
    }
}
