#![no_main]

use libfuzzer_sys::fuzz_target;
use qvote_crypto::{commitment_hash, verify_commitment};
use qvote_types::{CandidateId, PollId, Salt};

// A commitment always verifies against its own tuple and never against a
// different candidate.
fuzz_target!(|input: (u64, u64, u8, [u8; 32])| {
    let (poll, votes, candidate, salt) = input;
    let poll_id = PollId::new(poll);
    let candidate_id = CandidateId::new(candidate);
    let salt = Salt::new(salt);
    let hash = commitment_hash(poll_id, votes, candidate_id, &salt);
    assert!(verify_commitment(&hash, poll_id, votes, candidate_id, &salt));
    let other = CandidateId::new(candidate.wrapping_add(1));
    assert!(!verify_commitment(&hash, poll_id, votes, other, &salt));
});
