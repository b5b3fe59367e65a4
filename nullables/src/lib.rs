//! Nullable infrastructure for deterministic testing.
//!
//! Everything the voting machine consumes from its environment (the clock
//! and the transfer primitive) is abstracted behind a trait. This crate
//! provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never move real funds
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod treasury;

pub use clock::NullClock;
pub use treasury::NullTreasury;
