//! Vote commitments.
//!
//! A commitment is `keccak256(pollId ‖ numVotes ‖ candidateId ‖ salt)` where
//! each integer is a 32-byte big-endian word and the salt is 32 raw bytes.
//! The ledger stores only the commitment; at reveal it recomputes the hash
//! from the revealed tuple and compares.

use crate::hash::{keccak256, keccak256_multi};
use qvote_types::{AccountId, CandidateId, CommitHash, PollId, Salt};

/// Size of the packed commitment preimage.
pub const COMMITMENT_PREIMAGE_LEN: usize = 128;

fn word(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}

/// Pack the commitment preimage into its 128-byte wire form.
pub fn encode_commitment(
    poll_id: PollId,
    num_votes: u64,
    candidate_id: CandidateId,
    salt: &Salt,
) -> [u8; COMMITMENT_PREIMAGE_LEN] {
    let mut out = [0u8; COMMITMENT_PREIMAGE_LEN];
    out[..32].copy_from_slice(&word(poll_id.get()));
    out[32..64].copy_from_slice(&word(num_votes));
    out[64..96].copy_from_slice(&word(u64::from(candidate_id.get())));
    out[96..].copy_from_slice(salt.as_bytes());
    out
}

/// Compute the commitment a voter submits for the given vote.
pub fn commitment_hash(
    poll_id: PollId,
    num_votes: u64,
    candidate_id: CandidateId,
    salt: &Salt,
) -> CommitHash {
    CommitHash::new(keccak256_multi(&[
        &word(poll_id.get()),
        &word(num_votes),
        &word(u64::from(candidate_id.get())),
        salt.as_bytes(),
    ]))
}

/// Check a revealed tuple against a stored commitment.
pub fn verify_commitment(
    expected: &CommitHash,
    poll_id: PollId,
    num_votes: u64,
    candidate_id: CandidateId,
    salt: &Salt,
) -> bool {
    commitment_hash(poll_id, num_votes, candidate_id, salt) == *expected
}

/// Convenience salt: the hash of the account identifier.
///
/// Deterministic and therefore guessable; only suitable for demos and tests.
/// A real voter must pick a fresh random salt per commitment.
pub fn derive_salt(account: &AccountId) -> Salt {
    Salt::new(keccak256(account.as_bytes()))
}
