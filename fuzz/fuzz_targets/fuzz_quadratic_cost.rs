#![no_main]

use libfuzzer_sys::fuzz_target;
use qvote_ledger::quadratic_cost;
use qvote_types::Amount;

// The cost function must either return the exact product or report overflow.
fuzz_target!(|input: (u64, u128)| {
    let (num_votes, first_vote_cost) = input;
    let expected = u128::from(num_votes)
        .checked_mul(u128::from(num_votes))
        .and_then(|square| square.checked_mul(first_vote_cost));
    match quadratic_cost(num_votes, Amount::new(first_vote_cost)) {
        Ok(cost) => assert_eq!(Some(cost.raw()), expected),
        Err(_) => assert!(expected.is_none()),
    }
});
