use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Source of "now" for the aggregator and of sleeping for the refresh ticker. Tests substitute a
/// scripted clock to move across hours and days.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// Wall-clock time used to pick today's date and current hour.
    fn time(&self) -> DateTime<Utc>;

    /// Monotonic time used for scheduling ticks.
    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
