//! Progress display helpers shared by the session and the demo binary.

/// Format a millisecond count as `M:SS` for the progress readout.
/// Zero or unknown durations render as `0:00`.
pub fn format_time(ms: u64) -> String {
    if ms == 0 {
        return "0:00".to_string();
    }
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Progress through the track as a whole percentage, clamped to 0..=100.
/// A missing or zero duration reports 0 rather than dividing by it.
pub fn progress_percent(position_ms: u64, duration_ms: u64) -> u8 {
    if duration_ms == 0 {
        return 0;
    }
    let pct = (position_ms as f64 / duration_ms as f64) * 100.0;
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_time(65_000), "1:05");
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(59_999), "0:59");
        assert_eq!(format_time(600_000), "10:00");
    }

    #[test]
    fn percent_is_clamped_and_safe_on_zero_duration() {
        assert_eq!(progress_percent(50_000, 200_000), 25);
        assert_eq!(progress_percent(0, 200_000), 0);
        assert_eq!(progress_percent(250_000, 200_000), 100);
        assert_eq!(progress_percent(50_000, 0), 0);
    }
}
