/// Label shown until the first refresh finishes.
pub const PLACEHOLDER_LABEL: &str = "?h ??m";

/// Label shown instead of a total when the service can't be reached.
pub const ERROR_LABEL: &str = "Error";

/// Formats active seconds as `42m` below an hour and `3h 07m` above. Partial minutes are
/// dropped.
pub fn format_seconds(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.) as u64 } else { 0 };
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let minutes = minutes % 60;

    if hours == 0 {
        format!("{minutes}m")
    } else {
        format!("{hours}h {minutes:02}m")
    }
}

#[cfg(test)]
mod tests {
    use super::format_seconds;

    #[test]
    fn test_under_an_hour() {
        assert_eq!(format_seconds(0.), "0m");
        assert_eq!(format_seconds(59.9), "0m");
        assert_eq!(format_seconds(61.), "1m");
        assert_eq!(format_seconds(3599.), "59m");
    }

    #[test]
    fn test_hours_pad_minutes() {
        assert_eq!(format_seconds(3600.), "1h 00m");
        assert_eq!(format_seconds(3600. * 3. + 7. * 60. + 30.), "3h 07m");
        assert_eq!(format_seconds(36000. + 45. * 60.), "10h 45m");
    }

    #[test]
    fn test_invalid_values_show_zero() {
        assert_eq!(format_seconds(-20.), "0m");
        assert_eq!(format_seconds(f64::NAN), "0m");
    }
}
