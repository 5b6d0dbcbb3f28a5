use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a deployed process definition, e.g. `invoice:3:8f1c...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessDefinitionId(pub String);

/// Identifier of a started process instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessInstanceId(pub String);

impl ProcessDefinitionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ProcessInstanceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessDefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ProcessInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProcessDefinitionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&str> for ProcessInstanceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Multipart upload for `POST /deployment/create`.
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    pub deployment_name: String,
    pub source: String,
    pub enable_duplicate_filtering: bool,
    pub deploy_changed_only: bool,
    pub resource_name: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDefinition {
    pub id: ProcessDefinitionId,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub version: Option<i32>,
    #[serde(default)]
    pub deployment_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstance {
    pub id: ProcessInstanceId,
    #[serde(default)]
    pub definition_id: Option<String>,
    #[serde(default)]
    pub ended: Option<bool>,
}

/// Subset of `GET /history/process-instance/{id}`.
///
/// Timestamps stay raw strings; the engine's default format is not RFC 3339.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricProcessInstance {
    pub id: ProcessInstanceId,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}
