//! Fundamental types for the quadratic voting ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! accounts, identifiers, amounts, digests, timestamps, bounded text, poll phases
//! and the ledger parameters.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod ids;
pub mod params;
pub mod state;
pub mod text;
pub mod time;

pub use address::AccountId;
pub use amount::Amount;
pub use error::TypesError;
pub use hash::{CommitHash, Salt};
pub use ids::{CandidateId, PollId};
pub use params::LedgerParams;
pub use state::Phase;
pub use text::ShortText;
pub use time::{Clock, SystemClock, Timestamp};
