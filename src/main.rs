use anyhow::Result;
use clap::Parser;
use engine_loadtest::{cli::Cli, config::Config, report, telemetry, LoadDriver, RestEngineClient};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init_tracing(cli.json_logs, cli.verbose);

    let mut cfg = Config::load(cli.config.as_deref())?;
    cli.apply_to(&mut cfg);
    cfg.validate()?;

    let engine = Arc::new(RestEngineClient::from_config(&cfg.engine)?);
    let driver = LoadDriver::new(engine, cfg.clone());

    let report = tokio::select! {
        report = driver.run() => report?,
        _ = telemetry::shutdown_signal() => anyhow::bail!("load test interrupted"),
    };

    report::print_final_report(&report);

    if let Some(path) = &cfg.report.json_path {
        report.write_json(path)?;
        info!(path = %path.display(), "report written");
    }

    let soft_failures = report.soft_failures();
    if soft_failures > 0 {
        warn!(
            start_failures = report.start_failures,
            history_failures = report.history_failures,
            unfinished = report.history_unfinished,
            "load test finished with failed requests"
        );
        if cfg.load.fail_on_soft_errors {
            anyhow::bail!("{soft_failures} requests failed during the load test");
        }
    }

    Ok(())
}
