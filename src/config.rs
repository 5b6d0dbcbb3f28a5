use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::stats::AverageBasis;

const DEFAULT_CONFIG_FILE: &str = "config/default.toml";
const ENV_PREFIX: &str = "LOADTEST__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub deployment: DeploymentConfig,
    pub load: LoadConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
    pub request_timeout_seconds: u64,
    /// Per-request timeout for history reads.
    pub history_timeout_seconds: u64,
}

impl EngineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn history_timeout(&self) -> Duration {
        Duration::from_secs(self.history_timeout_seconds)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/engine-rest".to_string(),
            request_timeout_seconds: 30,
            history_timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub models_dir: PathBuf,
    pub source: String,
    pub enable_duplicate_filtering: bool,
    pub deploy_changed_only: bool,
    /// Multipart part name (and file name) the model content is uploaded under.
    pub resource_name: String,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("./resources"),
            source: "senergy".to_string(),
            enable_duplicate_filtering: true,
            deploy_changed_only: true,
            resource_name: "test.bpmn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub instances_per_definition: usize,
    pub max_concurrency: usize,
    pub settle_seconds: u64,
    /// How many times each instance's history is read.
    pub history_repeats: usize,
    /// Log start-phase progress every N completed requests (0 disables).
    pub progress_every: usize,
    pub fail_on_soft_errors: bool,
}

impl LoadConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_seconds)
    }

    pub fn total_instances(&self, definitions: usize) -> usize {
        definitions.saturating_mul(self.instances_per_definition)
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            instances_per_definition: 400,
            max_concurrency: 64,
            settle_seconds: 5,
            history_repeats: 1,
            progress_every: 100,
            fail_on_soft_errors: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub average_basis: AverageBasis,
    pub json_path: Option<PathBuf>,
}

impl Config {
    /// Layers built-in defaults, a TOML file and `LOADTEST__` environment
    /// variables (`LOADTEST__LOAD__MAX_CONCURRENCY=32`).
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => {
                if !p.is_file() {
                    anyhow::bail!("configuration file not found: {}", p.display());
                }
                p.to_path_buf()
            }
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(&file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        figment
            .extract()
            .with_context(|| format!("invalid configuration (file: {})", file.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.engine.base_url)
            .with_context(|| format!("engine.base_url is not a URL: {:?}", self.engine.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("engine.base_url must be http or https, got {}", url.scheme());
        }
        if self.engine.request_timeout_seconds == 0 {
            anyhow::bail!("engine.request_timeout_seconds must be greater than 0");
        }
        if self.engine.history_timeout_seconds == 0 {
            anyhow::bail!("engine.history_timeout_seconds must be greater than 0");
        }
        if self.deployment.resource_name.trim().is_empty() {
            anyhow::bail!("deployment.resource_name must not be empty");
        }
        if self.load.instances_per_definition == 0 {
            anyhow::bail!("load.instances_per_definition must be greater than 0");
        }
        if self.load.max_concurrency == 0 {
            anyhow::bail!("load.max_concurrency must be greater than 0");
        }
        if self.load.max_concurrency > Semaphore::MAX_PERMITS {
            anyhow::bail!(
                "load.max_concurrency must be at most {}, got {}",
                Semaphore::MAX_PERMITS,
                self.load.max_concurrency
            );
        }
        if self.load.history_repeats == 0 {
            anyhow::bail!("load.history_repeats must be greater than 0");
        }
        Ok(())
    }
}
