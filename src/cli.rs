use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::stats::AverageBasis;

/// Process engine load test
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "engine-loadtest")]
#[command(about = "Deploys process models, starts instances concurrently and reports cycle times")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML). Defaults to config/default.toml when present
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Engine REST base URL, e.g. http://localhost:8080/engine-rest
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory with the process models to deploy
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    /// Instances started per deployed definition
    #[arg(long)]
    pub instances: Option<usize>,

    /// Maximum number of start requests in flight
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Seconds to wait between starting instances and reading history
    #[arg(long)]
    pub settle_seconds: Option<u64>,

    /// History reads per instance
    #[arg(long)]
    pub history_repeats: Option<usize>,

    /// Timeout for a single history read in seconds
    #[arg(long)]
    pub history_timeout: Option<u64>,

    /// Divisor for the mean cycle time: successful, attempted
    #[arg(long)]
    pub average_basis: Option<AverageBasis>,

    /// Write the run report as JSON to this path
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// Exit non-zero when any start or history read failed
    #[arg(long)]
    pub fail_on_soft_errors: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Flags win over file and environment settings.
    pub fn apply_to(&self, cfg: &mut Config) {
        if let Some(url) = &self.base_url {
            cfg.engine.base_url = url.clone();
        }
        if let Some(dir) = &self.models_dir {
            cfg.deployment.models_dir = dir.clone();
        }
        if let Some(n) = self.instances {
            cfg.load.instances_per_definition = n;
        }
        if let Some(n) = self.concurrency {
            cfg.load.max_concurrency = n;
        }
        if let Some(secs) = self.settle_seconds {
            cfg.load.settle_seconds = secs;
        }
        if let Some(n) = self.history_repeats {
            cfg.load.history_repeats = n;
        }
        if let Some(secs) = self.history_timeout {
            cfg.engine.history_timeout_seconds = secs;
        }
        if let Some(basis) = self.average_basis {
            cfg.report.average_basis = basis;
        }
        if let Some(path) = &self.report_json {
            cfg.report.json_path = Some(path.clone());
        }
        if self.fail_on_soft_errors {
            cfg.load.fail_on_soft_errors = true;
        }
    }
}
