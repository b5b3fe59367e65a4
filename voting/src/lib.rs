//! Commit-reveal quadratic voting.
//!
//! Voters are approved per poll by its admin. During the commit window each
//! voter seals `n` votes behind a keccak-256 commitment and deposits
//! `n² × first_vote_cost`. During the equally long reveal window the voter
//! opens the commitment, the votes are tallied and the voter is refunded
//! `floor(total_paid / total_votes) × n`. Once the reveal window has closed the
//! poll is completed: the strictly greatest tally wins (ties report `0`) and
//! the unrefunded remainder goes to the poll's charity.
//!
//! A ledger-wide circuit breaker, held by the owner, halts voting and opens an
//! emergency withdrawal path.

pub mod breaker;
pub mod dispatch;
pub mod event;
pub mod machine;
pub mod payout;
pub mod treasury;

pub use breaker::CircuitBreaker;
pub use dispatch::{operation_span, Call, Operation, Outcome};
pub use event::{CompletionRecord, EventBus, LedgerEvent};
pub use machine::QuadraticVoting;
pub use payout::{charity_remainder, quote_refund, record_refund, RefundQuote};
pub use treasury::{AccountBook, Treasury, TransferError};
