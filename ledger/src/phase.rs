//! Phase clock: derives a poll's phase from the time and its boundaries.
//!
//! Phases are never advanced by a timer. Every mutating operation first
//! derives the phase for `now`, writes the advance into the stored phase,
//! and only then checks whether it is itself legal. An operation can
//! therefore move a poll forward and still be rejected.

use crate::error::LedgerError;
use qvote_types::{Phase, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A poll's phase boundaries.
///
/// The reveal window mirrors the commit window:
/// `end_reveal = start_reveal + (start_reveal - start_commit)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSchedule {
    start_commit: Timestamp,
    start_reveal: Timestamp,
    end_reveal: Timestamp,
}

impl PhaseSchedule {
    /// Validate and build a schedule.
    ///
    /// `start_commit` must be strictly after `now` and strictly before
    /// `start_reveal`. Every boundary, including the derived end of the reveal
    /// window, must be at most `max_secs`.
    pub fn new(
        start_commit: Timestamp,
        start_reveal: Timestamp,
        now: Timestamp,
        max_secs: u64,
    ) -> Result<Self, LedgerError> {
        if start_commit <= now {
            return Err(LedgerError::InvalidSchedule(
                "commit phase must start in the future",
            ));
        }
        if start_reveal <= start_commit {
            return Err(LedgerError::InvalidSchedule(
                "reveal phase must start after the commit phase",
            ));
        }
        let commit_window = start_reveal.as_secs() - start_commit.as_secs();
        let end_reveal = start_reveal
            .checked_add_secs(commit_window)
            .filter(|end| end.as_secs() <= max_secs)
            .ok_or(LedgerError::ArithmeticOverflow("phase schedule"))?;
        Ok(Self {
            start_commit,
            start_reveal,
            end_reveal,
        })
    }

    pub fn start_commit(&self) -> Timestamp {
        self.start_commit
    }

    pub fn start_reveal(&self) -> Timestamp {
        self.start_reveal
    }

    pub fn end_reveal(&self) -> Timestamp {
        self.end_reveal
    }

    /// Length of the commit window, which is also the length of the reveal window.
    pub fn window_secs(&self) -> u64 {
        self.start_reveal.as_secs() - self.start_commit.as_secs()
    }

    /// The next boundary after `now`, if any remain.
    pub fn next_boundary(&self, now: Timestamp) -> Option<Timestamp> {
        [self.start_commit, self.start_reveal, self.end_reveal]
            .into_iter()
            .find(|boundary| *boundary > now)
    }
}

/// What the clock says about a poll at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockPhase {
    /// `now < start_commit`
    Created,
    /// `start_commit <= now < start_reveal`
    Commit,
    /// `start_reveal <= now < end_reveal`
    Reveal,
    /// `now >= end_reveal`; eligible for completion.
    RevealEnded,
}

impl ClockPhase {
    /// The stored phase this reading advances a poll to.
    ///
    /// A finished reveal window leaves the poll in `Reveal`; only an explicit
    /// completion moves it to `Completed`.
    pub fn stored_phase(&self) -> Phase {
        match self {
            Self::Created => Phase::Created,
            Self::Commit => Phase::Commit,
            Self::Reveal | Self::RevealEnded => Phase::Reveal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Commit => "commit",
            Self::Reveal => "reveal",
            Self::RevealEnded => "reveal-ended",
        }
    }
}

impl fmt::Display for ClockPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the clock phase for `now`. Pure; never touches stored state.
pub fn derive_phase(now: Timestamp, schedule: &PhaseSchedule) -> ClockPhase {
    if now < schedule.start_commit {
        ClockPhase::Created
    } else if now < schedule.start_reveal {
        ClockPhase::Commit
    } else if now < schedule.end_reveal {
        ClockPhase::Reveal
    } else {
        ClockPhase::RevealEnded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u64 = u32::MAX as u64;

    fn schedule() -> PhaseSchedule {
        PhaseSchedule::new(Timestamp::new(1_000), Timestamp::new(2_000), Timestamp::new(10), MAX)
            .unwrap()
    }

    #[test]
    fn reveal_window_is_symmetric() {
        let s = schedule();
        assert_eq!(s.end_reveal(), Timestamp::new(3_000));
        assert_eq!(s.window_secs(), 1_000);
    }

    #[test]
    fn boundaries_belong_to_the_later_phase() {
        let s = schedule();
        assert_eq!(derive_phase(Timestamp::new(999), &s), ClockPhase::Created);
        assert_eq!(derive_phase(Timestamp::new(1_000), &s), ClockPhase::Commit);
        assert_eq!(derive_phase(Timestamp::new(1_999), &s), ClockPhase::Commit);
        assert_eq!(derive_phase(Timestamp::new(2_000), &s), ClockPhase::Reveal);
        assert_eq!(derive_phase(Timestamp::new(2_999), &s), ClockPhase::Reveal);
        assert_eq!(derive_phase(Timestamp::new(3_000), &s), ClockPhase::RevealEnded);
    }

    #[test]
    fn ended_reveal_stores_as_reveal() {
        assert_eq!(ClockPhase::RevealEnded.stored_phase(), Phase::Reveal);
    }

    #[test]
    fn commit_must_start_in_future() {
        let err = PhaseSchedule::new(Timestamp::new(10), Timestamp::new(20), Timestamp::new(10), MAX);
        assert!(matches!(err, Err(LedgerError::InvalidSchedule(_))));
    }

    #[test]
    fn reveal_must_follow_commit() {
        let err =
            PhaseSchedule::new(Timestamp::new(20), Timestamp::new(20), Timestamp::new(10), MAX);
        assert!(matches!(err, Err(LedgerError::InvalidSchedule(_))));
    }

    #[test]
    fn boundaries_beyond_32_bits_overflow() {
        let err = PhaseSchedule::new(
            Timestamp::new(43_000_000_000),
            Timestamp::new(43_000_000_001),
            Timestamp::new(1_700_000_000),
            MAX,
        );
        assert_eq!(err, Err(LedgerError::ArithmeticOverflow("phase schedule")));
    }

    #[test]
    fn derived_end_overflow_is_detected() {
        let err = PhaseSchedule::new(
            Timestamp::new(4_000_000_000),
            Timestamp::new(4_294_000_000),
            Timestamp::new(1_700_000_000),
            MAX,
        );
        assert_eq!(err, Err(LedgerError::ArithmeticOverflow("phase schedule")));
    }

    #[test]
    fn u64_wraparound_is_detected() {
        let err = PhaseSchedule::new(
            Timestamp::new(1),
            Timestamp::new(u64::MAX),
            Timestamp::new(0),
            u64::MAX,
        );
        assert_eq!(err, Err(LedgerError::ArithmeticOverflow("phase schedule")));
    }

    #[test]
    fn next_boundary_walks_forward() {
        let s = schedule();
        assert_eq!(s.next_boundary(Timestamp::new(0)), Some(Timestamp::new(1_000)));
        assert_eq!(s.next_boundary(Timestamp::new(1_000)), Some(Timestamp::new(2_000)));
        assert_eq!(s.next_boundary(Timestamp::new(3_000)), None);
    }
}
