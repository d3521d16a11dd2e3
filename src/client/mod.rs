//! Everything needed to ask the activity service a single question: how many seconds of
//! non-idle activity happened inside `[start, end)`.
//!
//! [DurationQuery] is the seam the aggregator talks to, [activitywatch::ActivityWatchClient] is
//! the HTTP realization of it.

pub mod activitywatch;
pub mod query;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::utils::time::to_time_period;

/// Half-open interval `[start, end)` a query is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimePeriod {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Empty periods can't contain any activity, so they never need to be queried.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn to_query_string(&self) -> String {
        to_time_period(self.start, self.end)
    }
}

/// Every way a single interval query can fail. The aggregator treats all of them the same (the
/// interval contributes nothing), the distinction only matters for diagnostics.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("activity service unreachable: {0}")]
    Transport(String),
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
    #[error("activity service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("activity service returned an empty response")]
    EmptyBody,
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl QueryError {
    /// Short name used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Transport(_) => "transport",
            QueryError::Timeout(_) => "timeout",
            QueryError::Status { .. } => "status",
            QueryError::EmptyBody => "empty-body",
            QueryError::Malformed(_) => "malformed",
        }
    }
}

/// Intended to abstract over the remote activity service so that aggregation can be tested
/// without one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DurationQuery: Send + Sync + 'static {
    /// Returns seconds of non-idle activity within `period`.
    async fn query_interval(&self, period: TimePeriod) -> Result<f64, QueryError>;
}
