//! Ledger parameters: the fixed-width limits every poll is validated against.

use serde::{Deserialize, Serialize};

/// Limits applied by the ledger when polls and candidates are registered.
///
/// The defaults reproduce the canonical deployment: 32-byte descriptions and
/// names, and phase boundaries that must fit 32-bit unsigned seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    /// Longest poll description, in bytes. Values above
    /// [`ShortText::MAX_LEN`](crate::ShortText::MAX_LEN) act as that ceiling.
    #[serde(default = "default_text_len")]
    pub max_description_len: usize,

    /// Longest candidate name, in bytes.
    #[serde(default = "default_text_len")]
    pub max_candidate_name_len: usize,

    /// Largest phase boundary (inclusive, Unix seconds) a schedule may use.
    /// Any boundary, including the derived end of the reveal window, above
    /// this value is an arithmetic overflow.
    #[serde(default = "default_max_schedule_secs")]
    pub max_schedule_secs: u64,
}

fn default_text_len() -> usize {
    32
}

fn default_max_schedule_secs() -> u64 {
    u32::MAX as u64
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            max_description_len: default_text_len(),
            max_candidate_name_len: default_text_len(),
            max_schedule_secs: default_max_schedule_secs(),
        }
    }
}
