//! The load run: health check, deploy, start, settle, read history, report.

pub mod history;
pub mod start;

pub use history::{
    cycle_time_seconds, fetch_all, get_history, parse_timestamp, HistoryOutcome, HistoryPhase,
    TimestampError,
};
pub use start::{start_all, start_instance, StartOutcome, StartPhase};

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::engine::{DeploymentRequest, EngineError, ProcessDefinitionId, ProcessEngine};
use crate::models::{discover_models, ModelFile};
use crate::report::RunReport;
use crate::stats::DurationStats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedModel {
    pub model: String,
    pub deployment_id: String,
    pub definition_id: ProcessDefinitionId,
}

pub struct LoadDriver {
    engine: Arc<dyn ProcessEngine>,
    cfg: Config,
}

impl LoadDriver {
    pub fn new(engine: Arc<dyn ProcessEngine>, cfg: Config) -> Self {
        Self { engine, cfg }
    }

    pub async fn health_check(&self) -> Result<()> {
        self.engine
            .health()
            .await
            .context("process engine is not available")
    }

    /// Uploads one model and resolves the definition it registered.
    pub async fn deploy(&self, model: &ModelFile) -> Result<DeployedModel> {
        let deployment_cfg = &self.cfg.deployment;
        let req = DeploymentRequest {
            deployment_name: model.name.clone(),
            source: deployment_cfg.source.clone(),
            enable_duplicate_filtering: deployment_cfg.enable_duplicate_filtering,
            deploy_changed_only: deployment_cfg.deploy_changed_only,
            resource_name: deployment_cfg.resource_name.clone(),
            content: model.content.clone(),
        };

        let deployment = self
            .engine
            .create_deployment(&req)
            .await
            .with_context(|| format!("process could not be deployed: {}", model.name))?;

        let definition = self
            .engine
            .definitions_for_deployment(&deployment.id)
            .await
            .with_context(|| format!("deployment id could not be found: {}", deployment.id))?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::NoDefinition {
                deployment_id: deployment.id.clone(),
            })
            .with_context(|| format!("process could not be deployed: {}", model.name))?;

        info!(
            model = %model.name,
            deployment = %deployment.id,
            definition = %definition.id,
            "process model deployed"
        );

        Ok(DeployedModel {
            model: model.name.clone(),
            deployment_id: deployment.id,
            definition_id: definition.id,
        })
    }

    /// Deploys models in order; the first failure aborts.
    pub async fn deploy_all(&self, models: &[ModelFile]) -> Result<Vec<DeployedModel>> {
        let mut deployed = Vec::with_capacity(models.len());
        for model in models {
            deployed.push(self.deploy(model).await?);
        }
        Ok(deployed)
    }

    pub async fn run(&self) -> Result<RunReport> {
        let load = &self.cfg.load;

        info!(base_url = %self.cfg.engine.base_url, "checking if process engine is available");
        self.health_check().await?;
        info!("process engine is available");

        let models = discover_models(&self.cfg.deployment.models_dir)?;
        info!(count = models.len(), "deploying process models");
        let deployed = self.deploy_all(&models).await?;
        let definitions: Vec<ProcessDefinitionId> =
            deployed.iter().map(|d| d.definition_id.clone()).collect();
        info!("process models deployed");

        info!(
            definitions = definitions.len(),
            per_definition = load.instances_per_definition,
            total = load.total_instances(definitions.len()),
            max_concurrency = load.max_concurrency,
            "starting process instances"
        );
        let started = start_all(
            Arc::clone(&self.engine),
            &definitions,
            load.instances_per_definition,
            load.max_concurrency,
            load.progress_every,
        )
        .await;
        info!(
            started = started.started(),
            failed = started.failed,
            elapsed_s = started.elapsed.as_secs_f64(),
            "process instances started"
        );

        let settle = load.settle_delay();
        if !settle.is_zero() {
            info!(seconds = settle.as_secs(), "waiting for process instances to finish");
            tokio::time::sleep(settle).await;
        }

        info!(
            instances = started.started(),
            repeats = load.history_repeats,
            "retrieving process instance history"
        );
        let history =
            fetch_all(self.engine.as_ref(), &started.instance_ids, load.history_repeats).await;
        info!(
            durations = history.durations.len(),
            failed = history.failed,
            unfinished = history.unfinished,
            "process instance history retrieved"
        );

        let stats = DurationStats::from_samples(
            &history.durations,
            self.cfg.report.average_basis,
            history.attempted,
        );

        Ok(RunReport::new(
            &self.cfg.engine.base_url,
            &deployed,
            &started,
            &history,
            stats,
        ))
    }
}
