use chrono::{DateTime, SecondsFormat, Utc};

/// This is the standard way of converting an instant into a string the query API understands.
/// Always UTC with millisecond precision, e.g. `2018-07-04T08:00:00.000Z`.
pub fn to_query_timestamp(moment: DateTime<Utc>) -> String {
    moment.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Renders `[start, end)` as a single `start/end` time period.
pub fn to_time_period(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!("{}/{}", to_query_timestamp(start), to_query_timestamp(end))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::to_time_period;

    #[test]
    fn test_time_period_format() {
        let start = Utc.with_ymd_and_hms(2018, 7, 4, 8, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2018, 7, 4, 9, 0, 0).unwrap();
        assert_eq!(
            to_time_period(start, end),
            "2018-07-04T08:00:00.000Z/2018-07-04T09:00:00.000Z"
        );
    }
}
