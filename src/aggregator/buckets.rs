use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

use crate::client::TimePeriod;

use super::DispatchError;

/// Resolves the instant local hour `hour` of `date` begins. `hour == 24` is the start of the
/// next day.
///
/// A repeated local time (clocks going back) resolves to its earliest occurrence, so the
/// repeated hour folds into the bucket before it. A skipped local time (clocks going forward)
/// resolves to the hour after it, which leaves the skipped bucket empty.
fn hour_start<Tz: TimeZone>(timezone: &Tz, date: NaiveDate, hour: u32) -> Option<DateTime<Utc>> {
    let naive = date.and_time(NaiveTime::MIN) + TimeDelta::hours(hour.into());
    timezone
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            timezone
                .from_local_datetime(&(naive + TimeDelta::hours(1)))
                .earliest()
        })
        .map(|v| v.with_timezone(&Utc))
}

/// Returns `[start of hour, start of next hour)` for local hour `hour` of `date`.
pub fn hour_period<Tz: TimeZone>(
    timezone: &Tz,
    date: NaiveDate,
    hour: u32,
) -> Result<TimePeriod, DispatchError> {
    let start = hour_start(timezone, date, hour)
        .ok_or(DispatchError::UnresolvableHour { date, hour })?;
    let end = hour_start(timezone, date, hour + 1).ok_or(DispatchError::UnresolvableHour {
        date,
        hour: hour + 1,
    })?;
    Ok(TimePeriod::new(start, end.max(start)))
}
