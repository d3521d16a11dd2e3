use serde::Serialize;
use serde_json::Value;

use super::{QueryError, TimePeriod};

/// Selects afk-watcher events whose status is not afk and sums their durations.
pub const ACTIVE_TIME_QUERY: [&str; 3] = [
    r#"afk_events = query_bucket(find_bucket("aw-watcher-afk_"));"#,
    r#"events = filter_keyvals(afk_events, "status", ["not-afk"]);"#,
    "RETURN = sum_durations(events);",
];

/// Body of a `POST /api/0/query/` request.
#[derive(Debug, Serialize, PartialEq)]
pub struct QueryRequest {
    pub query: &'static [&'static str],
    pub timeperiods: Vec<String>,
}

impl QueryRequest {
    pub fn active_time(period: &TimePeriod) -> Self {
        Self {
            query: &ACTIVE_TIME_QUERY,
            timeperiods: vec![period.to_query_string()],
        }
    }
}

/// Accepts a response body only if it is a JSON array holding exactly one finite, non-negative
/// number. That number is the amount of active seconds.
pub fn parse_duration_response(body: &str) -> Result<f64, QueryError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(QueryError::EmptyBody);
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| QueryError::Malformed(format!("response is not json: {e}")))?;

    let items = match value {
        Value::Null => return Err(QueryError::EmptyBody),
        Value::Array(items) => items,
        other => {
            return Err(QueryError::Malformed(format!(
                "expected an array, got {other}"
            )))
        }
    };

    let [item] = items.as_slice() else {
        return Err(QueryError::Malformed(format!(
            "expected exactly one value, got {}",
            items.len()
        )));
    };

    match item.as_f64() {
        Some(seconds) if seconds.is_finite() && seconds >= 0. => Ok(seconds),
        _ => Err(QueryError::Malformed(format!(
            "expected a non-negative number of seconds, got {item}"
        ))),
    }
}
