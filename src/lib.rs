//! Small tool that keeps a short "active time today" label up to date using an ActivityWatch
//! server. Today's total is assembled from hour buckets so finished hours are only ever asked
//! for once.
//!

pub mod aggregator;
pub mod cli;
pub mod client;
pub mod monitor;
pub mod status;
pub mod utils;
