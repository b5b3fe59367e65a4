//! Refund and charity payout arithmetic.
//!
//! Everything here is pure; the machine applies the results and performs the
//! transfers.

use qvote_ledger::{LedgerError, Poll};
use qvote_types::Amount;

/// A refund computed for one revealing (or withdrawing) voter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefundQuote {
    /// `floor(total_paid / total_votes_committed)` at the moment of the quote.
    pub per_vote: Amount,
    pub amount: Amount,
    /// True when the uncapped refund exceeded the poll's remaining funds.
    pub capped: bool,
}

/// Quote the refund for a commitment of `num_votes` against the poll's
/// current counters.
///
/// The refund is `per_vote × num_votes`, capped at the poll's unrefunded
/// remainder so that `total_refunded <= total_paid` always holds.
pub fn quote_refund(poll: &Poll, num_votes: u64) -> Result<RefundQuote, LedgerError> {
    let per_vote = match poll.total_votes_committed {
        0 => Amount::ZERO,
        votes => Amount::new(poll.total_paid.raw() / u128::from(votes)),
    };
    let uncapped = per_vote
        .raw()
        .checked_mul(u128::from(num_votes))
        .map(Amount::new)
        .ok_or(LedgerError::ArithmeticOverflow("refund"))?;
    let remaining = poll.remaining_funds()?;
    Ok(RefundQuote {
        per_vote,
        amount: uncapped.min(remaining),
        capped: uncapped > remaining,
    })
}

/// Book a refund against the poll's counters.
pub fn record_refund(poll: &mut Poll, amount: Amount) -> Result<(), LedgerError> {
    let refunded = poll
        .total_refunded
        .checked_add(amount)
        .ok_or(LedgerError::ArithmeticOverflow("total refunded"))?;
    if refunded > poll.total_paid {
        return Err(LedgerError::InsufficientBalance {
            needed: amount,
            available: poll.remaining_funds()?,
        });
    }
    poll.total_refunded = refunded;
    Ok(())
}

/// What the charity receives on completion.
pub fn charity_remainder(poll: &Poll) -> Result<Amount, LedgerError> {
    poll.remaining_funds()
}
