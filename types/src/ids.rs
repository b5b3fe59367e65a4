//! Poll and candidate identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential poll identifier. The first poll is `1`; ids are never reused.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PollId(u64);

impl PollId {
    pub const FIRST: Self = Self(1);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The id after this one, or `None` once the id space is exhausted.
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Candidate index within a poll, deliberately 8 bits wide.
///
/// Valid candidates are numbered `1..=candidate_count`; `0` is reserved as the
/// "tie" winner sentinel. Registration past `u8::MAX` must fail, never wrap.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CandidateId(u8);

impl CandidateId {
    /// Winner sentinel reported when no single candidate holds the maximum.
    pub const TIE: Self = Self(0);

    /// Highest index a poll can ever assign.
    pub const MAX: Self = Self(u8::MAX);

    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn is_tie(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
