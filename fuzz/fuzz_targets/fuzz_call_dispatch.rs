#![no_main]

use libfuzzer_sys::fuzz_target;
use qvote_types::{AccountId, LedgerParams, Timestamp};
use qvote_voting::{AccountBook, Call, QuadraticVoting};

// Arbitrary JSON call envelopes must parse or fail cleanly, and dispatching
// whatever parses must never panic or break the accounting invariants.
fuzz_target!(|data: &[u8]| {
    let Ok(owner) = AccountId::new("owner") else {
        return;
    };
    let mut vm = QuadraticVoting::new(owner, LedgerParams::default(), AccountBook::new());
    let mut now = 0u64;
    for line in data.split(|b| *b == b'\n') {
        let Ok(call) = serde_json::from_slice::<Call>(line) else {
            continue;
        };
        now = now.saturating_add(1);
        let _ = vm.dispatch(call, Timestamp::new(now));
        assert!(vm.ledger().check_invariants().is_ok());
    }
});
