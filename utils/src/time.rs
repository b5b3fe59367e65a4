//! Human-readable durations for phase windows in logs and CLI output.

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// Format a duration in seconds using its two most significant units.
pub fn format_duration(secs: u64) -> String {
    match secs {
        s if s < MINUTE => format!("{s}s"),
        s if s < HOUR => format!("{}m {}s", s / MINUTE, s % MINUTE),
        s if s < DAY => format!("{}h {}m", s / HOUR, (s % HOUR) / MINUTE),
        s if s < WEEK => format!("{}d {}h", s / DAY, (s % DAY) / HOUR),
        s => format!("{}w {}d", s / WEEK, (s % WEEK) / DAY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_two_largest_units() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(61), "1m 1s");
        assert_eq!(format_duration(3 * HOUR + 20 * MINUTE), "3h 20m");
        assert_eq!(format_duration(2 * DAY + 5 * HOUR), "2d 5h");
        assert_eq!(format_duration(WEEK), "1w 0d");
        assert_eq!(format_duration(2 * WEEK + 3 * DAY + 1), "2w 3d");
    }
}
