//! Hourly aggregation of today's active time.
//!
//! The day is split into hour buckets. Completed hours are immutable, so their results are kept
//! in a [DayCache] and fetched at most once per day. The current hour is still changing and is
//! re-queried on every refresh. A refresh therefore costs at most one query for the current
//! hour plus one for every completed hour not seen yet.

pub mod buckets;

use std::{collections::BTreeMap, sync::Arc};

use chrono::{NaiveDate, TimeZone, Timelike};
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinSet};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    client::{DurationQuery, TimePeriod},
    utils::clock::Clock,
};

use buckets::hour_period;

/// Failure of a refresh as a whole, as opposed to a failure of a single hour query which is
/// absorbed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("can't resolve hour {hour} of {date} in the local timezone")]
    UnresolvableHour { date: NaiveDate, hour: u32 },
    #[error("hour query task failed: {0}")]
    TaskFailed(String),
    #[error("all {attempted} hour queries failed")]
    AllQueriesFailed { attempted: usize },
}

/// The two possible results of a refresh.
#[derive(Debug)]
pub enum RefreshOutcome {
    ActivityTime { seconds: f64, increased: bool },
    ConnectionError(DispatchError),
}

/// Results of completed hours for a single calendar day.
#[derive(Debug, Default)]
pub struct DayCache {
    date: Option<NaiveDate>,
    hours: BTreeMap<u32, f64>,
}

impl DayCache {
    /// Makes sure the cache belongs to `today`. Returns true if a previous day had to be
    /// discarded.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.date == Some(today) {
            return false;
        }
        let rolled = self.date.is_some();
        self.hours.clear();
        self.date = Some(today);
        rolled
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn get(&self, hour: u32) -> Option<f64> {
        self.hours.get(&hour).copied()
    }

    /// Stores a completed hour. Writes for any other date than the one the cache is tagged with
    /// are dropped, which keeps a refresh started before midnight from leaking into the new day.
    pub fn store(&mut self, date: NaiveDate, hour: u32, seconds: f64) -> bool {
        if self.date != Some(date) {
            return false;
        }
        self.hours.insert(hour, seconds);
        true
    }

    pub fn clear(&mut self) {
        self.hours.clear();
        self.date = None;
    }
}

#[derive(Debug, Default)]
struct AggregatorState {
    cache: DayCache,
    current_hour: Option<u32>,
    previous_total: f64,
}

/// Owns the day cache and the trend state. State is only locked for short synchronous sections,
/// never across network requests, so overlapping refreshes are fine.
pub struct HourlyAggregator<Tz: TimeZone> {
    client: Arc<dyn DurationQuery>,
    clock: Box<dyn Clock>,
    timezone: Tz,
    state: Mutex<AggregatorState>,
}

type HourResult = (u32, Option<f64>);

impl<Tz> HourlyAggregator<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Send + Sync,
{
    pub fn new(client: Arc<dyn DurationQuery>, clock: Box<dyn Clock>, timezone: Tz) -> Self {
        Self {
            client,
            clock,
            timezone,
            state: Mutex::new(AggregatorState::default()),
        }
    }

    /// Computes today's active time, querying only the hours that aren't cached.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> RefreshOutcome {
        let now = self.clock.time().with_timezone(&self.timezone);
        let today = now.date_naive();
        let current_hour = now.hour();

        let mut hours = BTreeMap::new();
        let mut needed = Vec::new();
        {
            let mut state = self.state.lock().await;
            if state.cache.roll_over(today) {
                info!("Day changed to {today}, discarded cached hours");
            }
            state.current_hour = Some(current_hour);
            for hour in 0..=current_hour {
                match state.cache.get(hour) {
                    Some(seconds) if hour < current_hour => {
                        hours.insert(hour, seconds);
                    }
                    _ => needed.push(hour),
                }
            }
        }
        debug!("Cached hours: {}, querying {:?}", hours.len(), needed);

        let (fetched, failure) = match self.query_hours(today, needed).await {
            Ok(v) => v,
            Err(e) => {
                error!("Couldn't dispatch hour queries {e}");
                return RefreshOutcome::ConnectionError(e);
            }
        };

        let mut state = self.state.lock().await;
        for (hour, seconds) in fetched {
            let Some(seconds) = seconds else {
                continue;
            };
            if hour != current_hour {
                state.cache.store(today, hour, seconds);
            }
            hours.insert(hour, seconds);
        }

        if let Some(e) = failure {
            error!("Hour queries failed as a whole {e}");
            return RefreshOutcome::ConnectionError(e);
        }

        let seconds = hours.values().fold(0., |total, seconds| total + seconds);
        let increased = seconds > state.previous_total;
        state.previous_total = seconds;
        info!("Active today {seconds}s, increased: {increased}");

        RefreshOutcome::ActivityTime { seconds, increased }
    }

    /// Queries every hour in `hours` concurrently and waits for all of them. An hour that failed
    /// is reported as `None`. The second value is set when a query task itself died or when not
    /// a single query succeeded.
    async fn query_hours(
        &self,
        today: NaiveDate,
        hours: Vec<u32>,
    ) -> Result<(Vec<HourResult>, Option<DispatchError>), DispatchError> {
        let periods = hours
            .into_iter()
            .map(|hour| hour_period(&self.timezone, today, hour).map(|period| (hour, period)))
            .collect::<Result<Vec<_>, DispatchError>>()?;

        let mut results = Vec::with_capacity(periods.len());
        let mut tasks = JoinSet::new();
        for (hour, period) in periods {
            if period.is_empty() {
                results.push((hour, Some(0.)));
                continue;
            }
            let client = self.client.clone();
            tasks.spawn(async move { (hour, query_hour(client.as_ref(), hour, period).await) });
        }

        let attempted = tasks.len();
        let mut answered = 0;
        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    if result.1.is_some() {
                        answered += 1;
                    }
                    results.push(result)
                }
                Err(e) => {
                    error!("Hour query task died {e}");
                    failure.get_or_insert(DispatchError::TaskFailed(e.to_string()));
                }
            }
        }

        // Some hours answering means the service is up and the rest are absorbed as 0.
        if attempted > 0 && answered == 0 {
            failure.get_or_insert(DispatchError::AllQueriesFailed { attempted });
        }

        Ok((results, failure))
    }

    /// Forgets the day cache and current hour. Trend state survives.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.cache.clear();
        state.current_hour = None;
    }

    pub async fn previous_total(&self) -> f64 {
        self.state.lock().await.previous_total
    }

    pub async fn current_hour(&self) -> Option<u32> {
        self.state.lock().await.current_hour
    }

    /// Returns the date the cache is tagged with and the cached hours in order.
    pub async fn cached_hours(&self) -> (Option<NaiveDate>, Vec<(u32, f64)>) {
        let state = self.state.lock().await;
        (
            state.cache.date(),
            state.cache.hours.iter().map(|(h, s)| (*h, *s)).collect(),
        )
    }
}

async fn query_hour(client: &dyn DurationQuery, hour: u32, period: TimePeriod) -> Option<f64> {
    match client.query_interval(period).await {
        Ok(seconds) => {
            debug!("Hour {hour}: {seconds}s");
            Some(seconds)
        }
        Err(e) => {
            warn!(kind = e.kind(), "Hour {hour} query failed, counting it as 0: {e}");
            None
        }
    }
}
