//! Run summary: console report and optional JSON file.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::driver::{DeployedModel, HistoryPhase, StartPhase};
use crate::stats::DurationStats;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub base_url: String,
    pub finished_at: DateTime<Utc>,
    pub definitions: Vec<String>,
    pub instances_requested: usize,
    pub instances_started: usize,
    pub start_failures: usize,
    pub start_elapsed_seconds: f64,
    pub instance_ids: Vec<String>,
    pub history_attempted: usize,
    pub history_failures: usize,
    pub history_unfinished: usize,
    pub durations: Vec<f64>,
    pub stats: Option<DurationStats>,
}

impl RunReport {
    pub fn new(
        base_url: &str,
        deployed: &[DeployedModel],
        started: &StartPhase,
        history: &HistoryPhase,
        stats: Option<DurationStats>,
    ) -> Self {
        Self {
            base_url: base_url.to_string(),
            finished_at: Utc::now(),
            definitions: deployed
                .iter()
                .map(|d| d.definition_id.to_string())
                .collect(),
            instances_requested: started.requested,
            instances_started: started.started(),
            start_failures: started.failed,
            start_elapsed_seconds: started.elapsed.as_secs_f64(),
            instance_ids: started.instance_ids.iter().map(|id| id.to_string()).collect(),
            history_attempted: history.attempted,
            history_failures: history.failed,
            history_unfinished: history.unfinished,
            durations: history.durations.clone(),
            stats,
        }
    }

    /// Failed starts plus failed or unfinished history reads.
    pub fn soft_failures(&self) -> usize {
        self.start_failures + self.history_failures + self.history_unfinished
    }

    pub fn start_throughput(&self) -> f64 {
        if self.start_elapsed_seconds > 0.0 {
            self.instances_started as f64 / self.start_elapsed_seconds
        } else {
            0.0
        }
    }

    /// `min: 10.0, max: 10.0, avg: 10.0`
    pub fn summary_line(&self) -> Option<String> {
        self.stats.as_ref().map(|s| {
            format!("min: {:?}, max: {:?}, avg: {:?}", s.min, s.max, s.mean)
        })
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create report directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("cannot write report {}", path.display()))
    }
}

pub fn print_final_report(report: &RunReport) {
    println!("\n╔════════════════════════════════════════════════════════════════╗");
    println!("║                 PROCESS ENGINE LOAD TEST REPORT                ║");
    println!("╚════════════════════════════════════════════════════════════════╝");
    println!("   Engine:               {}", report.base_url);

    println!("\n   DEPLOYMENTS");
    println!("   Definitions:          {:>10}", report.definitions.len());

    println!("\n   INSTANCES");
    println!("   Requested:            {:>10}", report.instances_requested);
    println!("   Started:              {:>10}", report.instances_started);
    println!("   Failed:               {:>10}", report.start_failures);
    println!(
        "   Start Phase:          {:>10.3} s ({:.2} instances/sec)",
        report.start_elapsed_seconds,
        report.start_throughput()
    );

    println!("\n   HISTORY");
    println!("   Reads Attempted:      {:>10}", report.history_attempted);
    println!("   Cycle Times:          {:>10}", report.durations.len());
    println!("   Failed:               {:>10}", report.history_failures);
    println!("   Unfinished:           {:>10}", report.history_unfinished);

    match &report.stats {
        Some(stats) => {
            println!("\n   CYCLE TIME (seconds, mean over {} {})", stats.divisor, stats.basis);
            println!("   Min:                  {:>10.3}", stats.min);
            println!("   P50 (Median):         {:>10.3}", stats.p50);
            println!("   P95:                  {:>10.3}", stats.p95);
            println!("   P99:                  {:>10.3}", stats.p99);
            println!("   Max:                  {:>10.3}", stats.max);
            println!("   Mean:                 {:>10.3}", stats.mean);
            if !stats.mean_within_bounds() {
                println!("   note: mean includes failed history reads and is below the minimum");
            }
        }
        None => println!("\n   No cycle times collected."),
    }

    println!("════════════════════════════════════════════════════════════════");
    if let Some(line) = report.summary_line() {
        println!("{line}");
    }
}
