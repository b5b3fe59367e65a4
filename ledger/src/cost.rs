//! Quadratic cost calculator.

use crate::error::LedgerError;
use qvote_types::Amount;

/// Deposit required to cast `num_votes` votes: `num_votes² × first_vote_cost`.
///
/// All arithmetic is checked; a product outside `u128` is an
/// [`LedgerError::ArithmeticOverflow`], never a wrapped value.
pub fn quadratic_cost(num_votes: u64, first_vote_cost: Amount) -> Result<Amount, LedgerError> {
    let n = u128::from(num_votes);
    n.checked_mul(n)
        .and_then(|square| square.checked_mul(first_vote_cost.raw()))
        .map(Amount::new)
        .ok_or(LedgerError::ArithmeticOverflow("vote cost"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_votes_at_ten_cost_250() {
        assert_eq!(quadratic_cost(5, Amount::new(10)).unwrap(), Amount::new(250));
    }

    #[test]
    fn single_vote_costs_first_vote_cost() {
        assert_eq!(quadratic_cost(1, Amount::new(7)).unwrap(), Amount::new(7));
        assert_eq!(quadratic_cost(0, Amount::new(7)).unwrap(), Amount::ZERO);
    }

    #[test]
    fn max_votes_square_fits_but_cost_overflows() {
        assert_eq!(
            quadratic_cost(u64::MAX, Amount::new(1)).unwrap().raw(),
            u128::from(u64::MAX) * u128::from(u64::MAX)
        );
        assert_eq!(
            quadratic_cost(u64::MAX, Amount::new(2)),
            Err(LedgerError::ArithmeticOverflow("vote cost"))
        );
    }
}
