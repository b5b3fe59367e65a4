use qvote_types::{AccountId, Amount, CandidateId, Phase, PollId, Timestamp, TypesError};
use thiserror::Error;

/// Every way a ledger operation can be rejected.
///
/// A rejected operation leaves the ledger exactly as it was, except that the
/// lazy phase advance performed at the start of the operation is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ── Validation ──────────────────────────────────────────────────────
    #[error("invalid schedule: {0}")]
    InvalidSchedule(&'static str),

    #[error("first vote cost must be at least 1")]
    InvalidCost,

    #[error("incorrect payment: expected {expected}, received {received}")]
    IncorrectPayment { expected: Amount, received: Amount },

    #[error("at least one vote must be committed")]
    InsufficientVoteCount,

    #[error("text is {len} bytes, limit is {max}")]
    TextTooLong { len: usize, max: usize },

    #[error("operation does not accept payment, received {0}")]
    UnexpectedPayment(Amount),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // ── Authorization ───────────────────────────────────────────────────
    #[error("{caller} is not authorized for this operation")]
    NotAuthorized { caller: AccountId },

    #[error("{voter} is not an approved voter for poll {poll_id}")]
    NotApprovedVoter { poll_id: PollId, voter: AccountId },

    // ── Phase ───────────────────────────────────────────────────────────
    #[error("poll {poll_id} does not accept this operation in the {phase} phase")]
    WrongPhase { poll_id: PollId, phase: Phase },

    #[error("poll {poll_id} cannot complete before {end_reveal}")]
    TooEarly { poll_id: PollId, end_reveal: Timestamp },

    #[error("poll {0} is already completed")]
    AlreadyCompleted(PollId),

    // ── Integrity ───────────────────────────────────────────────────────
    #[error("poll {0} not found")]
    PollNotFound(PollId),

    #[error("candidate {candidate_id} not found in poll {poll_id}")]
    NoSuchCandidate {
        poll_id: PollId,
        candidate_id: CandidateId,
    },

    #[error("{voter} has no commitment in poll {poll_id}")]
    NoSuchCommitment { poll_id: PollId, voter: AccountId },

    #[error("{voter} has already committed in poll {poll_id}")]
    AlreadyCommitted { poll_id: PollId, voter: AccountId },

    #[error("{voter} has already revealed in poll {poll_id}")]
    AlreadyRevealed { poll_id: PollId, voter: AccountId },

    #[error("{voter} has already withdrawn from poll {poll_id}")]
    AlreadyWithdrawn { poll_id: PollId, voter: AccountId },

    #[error("revealed vote does not match the stored commitment")]
    HashMismatch,

    // ── Resource ────────────────────────────────────────────────────────
    #[error("arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    #[error("poll {0} already has the maximum number of candidates")]
    CandidateLimitExceeded(PollId),

    #[error("insufficient ledger balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    // ── Operational ─────────────────────────────────────────────────────
    #[error("circuit breaker is tripped")]
    CircuitBreakerTripped,

    #[error("circuit breaker is not tripped")]
    CircuitBreakerNotTripped,

    #[error("ledger has been decommissioned")]
    Decommissioned,

    #[error("transfer of {amount} to {to} failed: {reason}")]
    TransferFailed {
        to: AccountId,
        amount: Amount,
        reason: String,
    },
}

/// Coarse classification of [`LedgerError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller supplied bad arguments or payment.
    Validation,
    /// Caller lacks the required capability.
    Authorization,
    /// Operation not legal in the poll's current phase.
    Phase,
    /// Operation conflicts with recorded state.
    Integrity,
    /// Fixed-width or balance limits reached.
    Resource,
    /// Ledger-wide switches (circuit breaker, decommission) or the transfer primitive.
    Operational,
}

impl LedgerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidSchedule(_)
            | Self::InvalidCost
            | Self::IncorrectPayment { .. }
            | Self::InsufficientVoteCount
            | Self::TextTooLong { .. }
            | Self::UnexpectedPayment(_)
            | Self::InvalidInput(_) => ErrorCategory::Validation,
            Self::NotAuthorized { .. } | Self::NotApprovedVoter { .. } => {
                ErrorCategory::Authorization
            }
            Self::WrongPhase { .. } | Self::TooEarly { .. } | Self::AlreadyCompleted(_) => {
                ErrorCategory::Phase
            }
            Self::PollNotFound(_)
            | Self::NoSuchCandidate { .. }
            | Self::NoSuchCommitment { .. }
            | Self::AlreadyCommitted { .. }
            | Self::AlreadyRevealed { .. }
            | Self::AlreadyWithdrawn { .. }
            | Self::HashMismatch => ErrorCategory::Integrity,
            Self::ArithmeticOverflow(_)
            | Self::CandidateLimitExceeded(_)
            | Self::InsufficientBalance { .. } => ErrorCategory::Resource,
            Self::CircuitBreakerTripped
            | Self::CircuitBreakerNotTripped
            | Self::Decommissioned
            | Self::TransferFailed { .. } => ErrorCategory::Operational,
        }
    }
}

impl From<TypesError> for LedgerError {
    fn from(err: TypesError) -> Self {
        match err {
            TypesError::TextTooLong { len, max } => Self::TextTooLong { len, max },
            other => Self::InvalidInput(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_taxonomy() {
        assert_eq!(LedgerError::InvalidCost.category(), ErrorCategory::Validation);
        assert_eq!(
            LedgerError::AlreadyCompleted(PollId::FIRST).category(),
            ErrorCategory::Phase
        );
        assert_eq!(LedgerError::HashMismatch.category(), ErrorCategory::Integrity);
        assert_eq!(
            LedgerError::CandidateLimitExceeded(PollId::FIRST).category(),
            ErrorCategory::Resource
        );
        assert_eq!(
            LedgerError::CircuitBreakerTripped.category(),
            ErrorCategory::Operational
        );
    }

    #[test]
    fn text_limit_maps_through() {
        let err: LedgerError = TypesError::TextTooLong { len: 40, max: 32 }.into();
        assert_eq!(err, LedgerError::TextTooLong { len: 40, max: 32 });
    }
}
