//! Poll ledger for commit-reveal quadratic voting.
//!
//! The ledger is the single owned store of every poll, candidate, commitment
//! and voter approval. Records are looked up by key and never deleted; the
//! voting state machine is the only writer.
//!
//! This crate also holds the two pure calculators the state machine relies on:
//! the quadratic cost function and the phase clock.

pub mod cost;
pub mod error;
pub mod phase;
pub mod poll;
pub mod store;

pub use cost::quadratic_cost;
pub use error::{ErrorCategory, LedgerError};
pub use phase::{derive_phase, ClockPhase, PhaseSchedule};
pub use poll::{Candidate, Commitment, NewPoll, Poll};
pub use store::PollLedger;
