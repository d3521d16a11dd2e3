use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{bail, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    aggregator::{HourlyAggregator, RefreshOutcome},
    client::activitywatch::{ActivityWatchClient, DEFAULT_SERVER},
    monitor::{shutdown::detect_shutdown, StatusMonitor},
    status::{console::ConsolePresenter, StatusPresenter},
    utils::{
        clock::DefaultClock,
        dir::create_application_default_path,
        logging::{enable_logging, ONCE_PREFIX, WATCH_PREFIX},
        runtime::single_thread_runtime,
    },
};

#[derive(Parser, Debug)]
#[command(name = "awstatus", version, long_about = None)]
#[command(about = "Shows how long you have been active today according to ActivityWatch")]
pub struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory used for logs. By default $XDG_STATE_HOME/awstatus or $HOME/.local/state/awstatus"
    )]
    dir: Option<PathBuf>,
    #[arg(long = "log-filter", global = true, help = "Log level. Falls back to $RUST_LOG, then info")]
    log: Option<LevelFilter>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console", global = true)]
    log_console: bool,
    #[arg(long = "no-color", global = true, help = "Print the status without colors")]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Keep printing today's active time. Press Enter to refresh right away")]
    Watch {
        #[command(flatten)]
        query: QueryConfig,
        #[arg(
            long,
            default_value_t = 30,
            value_parser = clap::value_parser!(u64).range(1..),
            help = "Seconds between refreshes"
        )]
        interval: u64,
    },
    #[command(about = "Print today's active time once")]
    Once {
        #[command(flatten)]
        query: QueryConfig,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct QueryConfig {
    #[arg(long, default_value = DEFAULT_SERVER, help = "ActivityWatch server")]
    server: String,
    #[arg(
        long,
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Timeout of a single hour query in seconds"
    )]
    timeout: u64,
}

impl QueryConfig {
    fn create_aggregator(&self) -> Result<Arc<HourlyAggregator<Local>>> {
        let client = ActivityWatchClient::new(&self.server, Duration::from_secs(self.timeout))?;
        debug!("Querying {}", client.endpoint());
        Ok(Arc::new(HourlyAggregator::new(
            Arc::new(client),
            Box::new(DefaultClock),
            Local,
        )))
    }
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args.dir.clone().map_or_else(create_application_default_path, Ok)?;
    let prefix = match args.commands {
        Commands::Watch { .. } => WATCH_PREFIX,
        Commands::Once { .. } => ONCE_PREFIX,
    };
    enable_logging(prefix, &app_dir.join("logs"), args.log, args.log_console)?;

    let presenter = Arc::new(ConsolePresenter::new(!args.no_color));
    let runtime = single_thread_runtime()?;
    let result = runtime.block_on(async move {
        match args.commands {
            Commands::Watch { query, interval } => {
                watch(query, Duration::from_secs(interval), presenter).await
            }
            Commands::Once { query } => once(query, presenter).await,
        }
    });
    // A pending stdin read can't be cancelled, so don't wait for it.
    runtime.shutdown_background();
    result
}

async fn watch(
    query: QueryConfig,
    interval: Duration,
    presenter: Arc<ConsolePresenter>,
) -> Result<()> {
    presenter.show_placeholder();
    let monitor = StatusMonitor::new(
        query.create_aggregator()?,
        presenter,
        interval,
        Box::new(DefaultClock),
    );
    let handle = monitor.start();

    let shutdown = handle.shutdown_token();
    tokio::select! {
        _ = detect_shutdown(shutdown) => {}
        _ = handle.forward_refresh_requests(BufReader::new(tokio::io::stdin())) => {
            // Without stdin the monitor simply keeps going until Ctrl-C.
            detect_shutdown(handle.shutdown_token()).await;
        }
    }
    handle.stop().await
}

async fn once(query: QueryConfig, presenter: Arc<ConsolePresenter>) -> Result<()> {
    let outcome = query.create_aggregator()?.refresh().await;
    presenter.present(&outcome);
    if let RefreshOutcome::ConnectionError(e) = outcome {
        bail!("Couldn't compute active time: {e}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Args, Commands};

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_watch_defaults() {
        let args = Args::parse_from(["awstatus", "watch"]);
        let Commands::Watch { query, interval } = args.commands else {
            panic!("Expected watch");
        };
        assert_eq!(interval, 30);
        assert_eq!(query.server, "http://localhost:5600");
        assert_eq!(query.timeout, 5);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(Args::try_parse_from(["awstatus", "watch", "--interval", "0"]).is_err());
        assert!(Args::try_parse_from(["awstatus", "once", "--timeout", "0"]).is_err());
    }
}
