//! Cryptographic primitives for the quadratic voting ledger.
//!
//! - **Keccak-256** for hashing
//! - Commitment construction and verification over the packed
//!   `(pollId, numVotes, candidateId, salt)` tuple
//!
//! The same [`commitment_hash`] is used by voters (off-ledger, to produce the
//! commitment) and by the ledger (to check a reveal), so both sides always
//! agree on the encoding.

pub mod commitment;
pub mod hash;

pub use commitment::{commitment_hash, derive_salt, encode_commitment, verify_commitment};
pub use hash::{keccak256, keccak256_multi};
