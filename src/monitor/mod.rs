//! Long running side of the application. [StatusMonitor] drives the aggregator: one refresh
//! right away, then one every interval, plus one for every manual trigger.

pub mod shutdown;

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use chrono::TimeZone;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::mpsc,
    task::{JoinHandle, JoinSet},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::{aggregator::HourlyAggregator, status::StatusPresenter, utils::clock::Clock};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Pending manual triggers beyond this are dropped, a refresh is already queued anyway.
const TRIGGER_BUFFER: usize = 4;

pub struct StatusMonitor<Tz: TimeZone> {
    aggregator: Arc<HourlyAggregator<Tz>>,
    presenter: Arc<dyn StatusPresenter>,
    refresh_interval: Duration,
    clock: Box<dyn Clock>,
}

/// Handle to a started [StatusMonitor]. Dropping it without [MonitorHandle::stop] leaves the
/// monitor running until the runtime shuts down.
pub struct MonitorHandle {
    shutdown: CancellationToken,
    trigger: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl<Tz> StatusMonitor<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Send + Sync,
{
    pub fn new(
        aggregator: Arc<HourlyAggregator<Tz>>,
        presenter: Arc<dyn StatusPresenter>,
        refresh_interval: Duration,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            aggregator,
            presenter,
            refresh_interval,
            clock,
        }
    }

    /// Spawns the refresh loop on the current runtime.
    pub fn start(self) -> MonitorHandle {
        let shutdown = CancellationToken::new();
        let (trigger, triggers) = mpsc::channel(TRIGGER_BUFFER);
        let task = tokio::spawn(self.run(shutdown.clone(), triggers));
        MonitorHandle {
            shutdown,
            trigger,
            task,
        }
    }

    fn spawn_refresh(&self, in_flight: &mut JoinSet<()>, reason: &'static str) {
        let aggregator = self.aggregator.clone();
        let presenter = self.presenter.clone();
        let span = info_span!("refresh", reason);
        in_flight.spawn(
            async move {
                let outcome = aggregator.refresh().await;
                presenter.present(&outcome);
            }
            .instrument(span),
        );
    }

    /// Executes the monitor event loop until `shutdown` is cancelled.
    async fn run(self, shutdown: CancellationToken, mut triggers: mpsc::Receiver<()>) {
        let mut next_tick = self.clock.instant();
        let mut in_flight = JoinSet::new();
        let mut triggers_open = true;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.clock.sleep_until(next_tick) => {
                    next_tick += self.refresh_interval;
                    self.spawn_refresh(&mut in_flight, "tick");
                }
                trigger = triggers.recv(), if triggers_open => match trigger {
                    Some(()) => self.spawn_refresh(&mut in_flight, "manual"),
                    None => triggers_open = false,
                },
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!("Refresh task failed {e:?}");
                    }
                }
            }
        }

        // In-flight refreshes are dropped so nothing is presented after teardown.
        debug!("Aborting {} in-flight refreshes", in_flight.len());
        in_flight.abort_all();
        while in_flight.join_next().await.is_some() {}
        info!("Status monitor stopped");
    }
}

impl MonitorHandle {
    /// Requests a refresh outside of the regular schedule.
    pub fn refresh_now(&self) {
        if self.trigger.try_send(()).is_err() {
            debug!("Manual refresh already queued");
        }
    }

    /// Requests a refresh for every line read from `input`. Returns once `input` is exhausted,
    /// the monitor keeps running on its schedule after that.
    pub async fn forward_refresh_requests(&self, input: impl AsyncBufRead + Unpin) {
        let mut lines = input.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(_)) => self.refresh_now(),
                Ok(None) => break,
                Err(e) => {
                    warn!("Couldn't read refresh requests {e}");
                    break;
                }
            }
        }
        debug!("Refresh requests closed, manual refresh disabled");
    }

    /// Token that stops the monitor when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stops the ticker, drops in-flight refreshes and waits for the loop to finish.
    pub async fn stop(self) -> Result<()> {
        self.shutdown.cancel();
        self.wait().await
    }

    /// Waits for the loop to finish without stopping it.
    pub async fn wait(self) -> Result<()> {
        self.task
            .await
            .map_err(|e| anyhow!("Status monitor task failed {e}"))
    }
}
