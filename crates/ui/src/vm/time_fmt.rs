use chrono::{DateTime, Duration, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

/// `mm:ss`, minutes not capped at 59. Negative durations clamp to `00:00`.
#[must_use]
pub fn format_clock(value: Duration) -> String {
    let total = value.num_seconds().max(0);
    let minutes = total / 60;
    let seconds = total % 60;
    format!("{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[test]
    fn clock_pads_and_clamps() {
        assert_eq!(format_clock(Duration::seconds(0)), "00:00");
        assert_eq!(format_clock(Duration::seconds(65)), "01:05");
        assert_eq!(format_clock(Duration::seconds(3_725)), "62:05");
        assert_eq!(format_clock(Duration::seconds(-5)), "00:00");
    }

    #[test]
    fn datetime_is_minute_precision() {
        assert_eq!(format_datetime(fixed_now()), "2023-11-14 22:13");
    }
}
