//! Display formatting for session timers.

/// `MM:SS.cc`, or `HH:MM:SS.cc` once an hour has passed.
pub fn format_stopwatch(elapsed_ms: u64) -> String {
    let centis = (elapsed_ms % 1000) / 10;
    let secs = (elapsed_ms / 1000) % 60;
    let mins = (elapsed_ms / 60_000) % 60;
    let hours = elapsed_ms / 3_600_000;
    if hours > 0 {
        format!("{hours:02}:{mins:02}:{secs:02}.{centis:02}")
    } else {
        format!("{mins:02}:{secs:02}.{centis:02}")
    }
}

/// `MM:SS`, rounding partial seconds up so `00:00` only shows at zero.
pub fn format_countdown(remaining_ms: u64) -> String {
    let total_secs = remaining_ms.div_ceil(1000);
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopwatch_format() {
        assert_eq!(format_stopwatch(0), "00:00.00");
        assert_eq!(format_stopwatch(61_230), "01:01.23");
        assert_eq!(format_stopwatch(3_723_450), "01:02:03.45");
    }

    #[test]
    fn countdown_format() {
        assert_eq!(format_countdown(300_000), "05:00");
        assert_eq!(format_countdown(59_001), "01:00");
        assert_eq!(format_countdown(0), "00:00");
    }
}
