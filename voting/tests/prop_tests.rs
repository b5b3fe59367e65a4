use proptest::prelude::*;

use qvote_crypto::{commitment_hash, derive_salt};
use qvote_ledger::NewPoll;
use qvote_nullables::NullTreasury;
use qvote_types::{AccountId, Amount, CandidateId, LedgerParams, Timestamp};
use qvote_voting::QuadraticVoting;

#[derive(Clone, Copy, Debug)]
enum Fate {
    Reveal,
    /// Emergency withdrawal straight after committing.
    Withdraw,
    Abstain,
}

fn fate() -> impl Strategy<Value = Fate> {
    prop_oneof![Just(Fate::Reveal), Just(Fate::Withdraw), Just(Fate::Abstain)]
}

fn voters() -> impl Strategy<Value = Vec<(u8, u64, Fate)>> {
    prop::collection::vec((1u8..=3, 1u64..50, fate()), 1..8)
}

fn acct(name: &str) -> AccountId {
    AccountId::new(name).unwrap()
}

proptest! {
    /// Every unit deposited ends up with exactly one recipient, refunds never
    /// exceed deposits, and tallies match the revealed commitments.
    #[test]
    fn funds_are_conserved(cost in 1u128..1_000, voters in voters()) {
        let owner = acct("owner");
        let admin = acct("admin");
        let mut vm = QuadraticVoting::new(owner.clone(), LedgerParams::default(), NullTreasury::new());
        let poll_id = vm.create_poll(
            NewPoll {
                creator: admin.clone(),
                start_commit: Timestamp::new(100),
                start_reveal: Timestamp::new(200),
                first_vote_cost: Amount::new(cost),
                description: b"prop".to_vec(),
                charity: acct("charity"),
            },
            Timestamp::new(0),
        ).unwrap();
        for name in ["a", "b", "c"] {
            vm.add_candidate(&admin, poll_id, name.as_bytes().to_vec(), Timestamp::new(0)).unwrap();
        }

        let commit_at = Timestamp::new(150);
        let mut total_paid = 0u128;
        for (i, (candidate, votes, fate)) in voters.iter().enumerate() {
            let voter = acct(&format!("voter{i}"));
            vm.approve_voter(&admin, poll_id, voter.clone(), commit_at).unwrap();
            let salt = derive_salt(&voter);
            let hash = commitment_hash(poll_id, *votes, CandidateId::new(*candidate), &salt);
            let payment = u128::from(*votes) * u128::from(*votes) * cost;
            vm.commit_vote(&voter, poll_id, hash, *votes, Amount::new(payment), commit_at).unwrap();
            total_paid += payment;

            if let Fate::Withdraw = fate {
                vm.toggle_active(&owner).unwrap();
                vm.withdraw(&voter, poll_id, CandidateId::new(*candidate), &salt, commit_at).unwrap();
                vm.toggle_active(&owner).unwrap();
            }
            prop_assert!(vm.ledger().check_invariants().is_ok());
            prop_assert_eq!(vm.ledger().total_held(), Some(vm.balance()));
        }

        let reveal_at = Timestamp::new(250);
        let mut expected_tally = [0u64; 3];
        for (i, (candidate, votes, fate)) in voters.iter().enumerate() {
            if let Fate::Reveal = fate {
                let voter = acct(&format!("voter{i}"));
                vm.reveal_vote(&voter, poll_id, CandidateId::new(*candidate), &derive_salt(&voter), reveal_at).unwrap();
                expected_tally[usize::from(*candidate) - 1] += *votes;
            }
            prop_assert!(vm.ledger().check_invariants().is_ok());
            prop_assert_eq!(vm.ledger().total_held(), Some(vm.balance()));
        }

        for (idx, expected) in expected_tally.iter().enumerate() {
            let id = CandidateId::new(u8::try_from(idx + 1).unwrap());
            prop_assert_eq!(vm.candidate(poll_id, id).unwrap().vote_count, *expected);
        }

        let record = vm.complete_poll(poll_id, Timestamp::new(300)).unwrap();
        let poll = vm.poll(poll_id).unwrap();
        prop_assert_eq!(poll.total_paid.raw(), total_paid);
        prop_assert_eq!(vm.balance(), Amount::ZERO);
        prop_assert_eq!(vm.treasury().total_sent().raw(), total_paid);
        prop_assert_eq!(record.amount_donated, vm.treasury().received(&acct("charity")));

        let best = expected_tally.iter().copied().max().unwrap_or(0);
        let leaders = expected_tally.iter().filter(|t| **t == best).count();
        if best == 0 || leaders > 1 {
            prop_assert!(record.winner.is_tie());
        } else {
            let pos = expected_tally.iter().position(|t| *t == best).unwrap();
            prop_assert_eq!(usize::from(record.winner.get()), pos + 1);
        }
    }

    /// A reveal's refund is the floor of paid-per-vote times the voter's votes.
    #[test]
    fn single_reveal_refund_is_exact(cost in 1u128..10_000, votes in 1u64..1_000) {
        let admin = acct("admin");
        let voter = acct("voter");
        let mut vm = QuadraticVoting::new(acct("owner"), LedgerParams::default(), NullTreasury::new());
        let poll_id = vm.create_poll(
            NewPoll {
                creator: admin.clone(),
                start_commit: Timestamp::new(10),
                start_reveal: Timestamp::new(20),
                first_vote_cost: Amount::new(cost),
                description: Vec::new(),
                charity: acct("charity"),
            },
            Timestamp::new(0),
        ).unwrap();
        vm.add_candidate(&admin, poll_id, b"x".to_vec(), Timestamp::new(0)).unwrap();
        vm.approve_voter(&admin, poll_id, voter.clone(), Timestamp::new(0)).unwrap();
        let salt = derive_salt(&voter);
        let hash = commitment_hash(poll_id, votes, CandidateId::new(1), &salt);
        let paid = u128::from(votes) * u128::from(votes) * cost;
        vm.commit_vote(&voter, poll_id, hash, votes, Amount::new(paid), Timestamp::new(10)).unwrap();
        let refund = vm.reveal_vote(&voter, poll_id, CandidateId::new(1), &salt, Timestamp::new(20)).unwrap();
        prop_assert_eq!(refund.raw(), paid);
    }
}
