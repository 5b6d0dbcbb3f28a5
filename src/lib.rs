//! Load driver for process-engine REST APIs.
//!
//! A run deploys every model in a directory, starts a batch of instances per
//! deployed definition with bounded concurrency, waits for them to settle and
//! then reads the history of each instance to report cycle-time statistics.

pub mod cli;
pub mod config;
pub mod driver;
pub mod engine;
pub mod models;
pub mod report;
pub mod stats;
pub mod telemetry;

pub use config::Config;
pub use driver::LoadDriver;
pub use engine::{ProcessEngine, RestEngineClient};
pub use report::RunReport;
