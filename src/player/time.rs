/// Format a position in seconds as `M:SS`.
///
/// Minutes are not padded and keep counting past the hour (`3600.0` is
/// `"60:00"`). Non-finite input renders as `"0:00"`; negative input is
/// treated as zero.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "0:00".to_string();
    }
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::format_time;

    #[test]
    fn formats_minutes_unpadded_and_seconds_padded() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(5.0), "0:05");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(599.0), "9:59");
        assert_eq!(format_time(3600.0), "60:00");
    }

    #[test]
    fn fractional_seconds_are_floored() {
        assert_eq!(format_time(59.999), "0:59");
        assert_eq!(format_time(119.5), "1:59");
    }

    #[test]
    fn unknown_or_negative_times_render_as_zero() {
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
        assert_eq!(format_time(-3.0), "0:00");
    }
}
