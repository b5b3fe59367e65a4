//! Records emitted by successful operations.

use qvote_types::{AccountId, Amount, CandidateId, PollId, ShortText, Timestamp};
use serde::{Deserialize, Serialize};

/// Outcome of a completed poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub poll_id: PollId,
    /// [`CandidateId::TIE`] when no single candidate holds the maximum.
    pub winner: CandidateId,
    pub amount_donated: Amount,
}

/// Emitted exactly once per successful operation of the matching kind.
///
/// Poll-scoped events carry the description and schedule so observers can
/// render poll listings without querying the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    PollCreated {
        poll_id: PollId,
        creator: AccountId,
        description: ShortText,
        start_commit: Timestamp,
        end_reveal: Timestamp,
    },
    VoterApproved {
        poll_id: PollId,
        voter: AccountId,
        description: ShortText,
        start_commit: Timestamp,
        end_reveal: Timestamp,
    },
    VoterRemoved {
        poll_id: PollId,
        voter: AccountId,
    },
    AdminTransferred {
        poll_id: PollId,
        former_admin: AccountId,
        new_admin: AccountId,
        description: ShortText,
        start_commit: Timestamp,
        end_reveal: Timestamp,
    },
    PollCompleted(CompletionRecord),
}

impl LedgerEvent {
    pub fn poll_id(&self) -> PollId {
        match self {
            Self::PollCreated { poll_id, .. }
            | Self::VoterApproved { poll_id, .. }
            | Self::VoterRemoved { poll_id, .. }
            | Self::AdminTransferred { poll_id, .. } => *poll_id,
            Self::PollCompleted(record) => record.poll_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::PollCreated { .. } => "poll_created",
            Self::VoterApproved { .. } => "voter_approved",
            Self::VoterRemoved { .. } => "voter_removed",
            Self::AdminTransferred { .. } => "admin_transferred",
            Self::PollCompleted(_) => "poll_completed",
        }
    }
}

/// Synchronous fan-out bus for [`LedgerEvent`]s.
///
/// Listeners run inline inside the emitting operation and must not call back
/// into the ledger.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
