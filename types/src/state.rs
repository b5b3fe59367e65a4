//! Stored poll phase.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The stored phase of a poll.
///
/// Declaration order is the lifecycle order, so `Ord` answers "has the poll
/// advanced at least this far". A poll's phase never moves backwards.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Phase {
    /// Scheduled; commit window not yet open.
    Created,
    /// Approved voters may commit hashed votes and pay deposits.
    Commit,
    /// Committed voters may reveal and collect refunds.
    Reveal,
    /// Tallied and donated; terminal.
    Completed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Commit => "commit",
            Self::Reveal => "reveal",
            Self::Completed => "completed",
        }
    }

    /// Whether candidates may still be registered.
    pub fn accepts_candidates(&self) -> bool {
        matches!(self, Self::Created | Self::Commit)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_order() {
        assert!(Phase::Created < Phase::Commit);
        assert!(Phase::Commit < Phase::Reveal);
        assert!(Phase::Reveal < Phase::Completed);
    }

    #[test]
    fn candidate_window() {
        assert!(Phase::Created.accepts_candidates());
        assert!(Phase::Commit.accepts_candidates());
        assert!(!Phase::Reveal.accepts_candidates());
        assert!(!Phase::Completed.accepts_candidates());
    }
}
