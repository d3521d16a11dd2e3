use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{
    query::{parse_duration_response, QueryRequest},
    DurationQuery, QueryError, TimePeriod,
};

pub const DEFAULT_SERVER: &str = "http://localhost:5600";
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

const QUERY_PATH: &str = "/api/0/query/";

/// Longest slice of an error body kept for diagnostics.
const MAX_ERROR_BODY: usize = 500;

/// Queries a local ActivityWatch server. A single [reqwest::Client] is shared by all hour
/// queries so concurrent requests reuse pooled connections.
#[derive(Debug, Clone)]
pub struct ActivityWatchClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl ActivityWatchClient {
    pub fn new(server: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{QUERY_PATH}", server.trim_end_matches('/')),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, error: reqwest::Error) -> QueryError {
        if error.is_timeout() {
            QueryError::Timeout(self.timeout)
        } else {
            QueryError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl DurationQuery for ActivityWatchClient {
    #[instrument(skip_all, fields(period = %period.to_query_string()))]
    async fn query_interval(&self, period: TimePeriod) -> Result<f64, QueryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&QueryRequest::active_time(&period))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        debug!("Received {} bytes", body.len());
        parse_duration_response(&body)
    }
}
