#![no_main]

use libfuzzer_sys::fuzz_target;
use qvote_ledger::{derive_phase, ClockPhase, PhaseSchedule};
use qvote_types::Timestamp;

// Schedule construction never panics, and accepted schedules are ordered,
// symmetric and within the cap.
fuzz_target!(|input: (u64, u64, u64, u64, u64)| {
    let (start_commit, start_reveal, now, max_secs, probe) = input;
    let Ok(schedule) = PhaseSchedule::new(
        Timestamp::new(start_commit),
        Timestamp::new(start_reveal),
        Timestamp::new(now),
        max_secs,
    ) else {
        return;
    };
    assert!(schedule.start_commit() > Timestamp::new(now));
    assert!(schedule.start_reveal() > schedule.start_commit());
    assert!(schedule.end_reveal().as_secs() <= max_secs);
    assert_eq!(
        schedule.end_reveal().as_secs() - schedule.start_reveal().as_secs(),
        schedule.window_secs()
    );

    let phase = derive_phase(Timestamp::new(probe), &schedule);
    if probe >= schedule.end_reveal().as_secs() {
        assert_eq!(phase, ClockPhase::RevealEnded);
    }
});
