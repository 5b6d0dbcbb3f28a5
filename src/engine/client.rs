use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{
    Deployment, DeploymentRequest, EngineError, HistoricProcessInstance, ProcessDefinition,
    ProcessDefinitionId, ProcessInstance, ProcessInstanceId,
};
use crate::config::EngineConfig;

/// The engine calls a load run is made of.
#[async_trait]
pub trait ProcessEngine: Send + Sync {
    /// `GET /engine`
    async fn health(&self) -> Result<(), EngineError>;

    /// `POST /deployment/create`
    async fn create_deployment(&self, req: &DeploymentRequest) -> Result<Deployment, EngineError>;

    /// `GET /process-definition?deploymentId=..`
    async fn definitions_for_deployment(
        &self,
        deployment_id: &str,
    ) -> Result<Vec<ProcessDefinition>, EngineError>;

    /// `POST /process-definition/{id}/start`
    async fn start_instance(
        &self,
        definition: &ProcessDefinitionId,
    ) -> Result<ProcessInstance, EngineError>;

    /// `GET /history/process-instance/{id}`
    async fn instance_history(
        &self,
        instance: &ProcessInstanceId,
    ) -> Result<HistoricProcessInstance, EngineError>;
}

/// `ProcessEngine` over the engine's `engine-rest` HTTP API.
#[derive(Clone)]
pub struct RestEngineClient {
    base_url: String,
    client: reqwest::Client,
    history_timeout: Duration,
}

impl RestEngineClient {
    pub fn new(base_url: &str, request_timeout: Duration, history_timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("engine-loadtest/", env!("CARGO_PKG_VERSION"))),
        );
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            history_timeout,
        })
    }

    pub fn from_config(cfg: &EngineConfig) -> Result<Self> {
        Self::new(&cfg.base_url, cfg.request_timeout(), cfg.history_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Reads the body of a `200 OK` response; any other status is an error.
async fn ok_body(operation: &'static str, resp: Response) -> Result<String, EngineError> {
    let status = resp.status();
    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        return Err(EngineError::UnexpectedStatus {
            operation,
            status,
            body,
        });
    }
    resp.text().await.map_err(transport(operation))
}

fn decode<T: DeserializeOwned>(operation: &'static str, body: &str) -> Result<T, EngineError> {
    serde_json::from_str(body).map_err(|source| EngineError::Decode { operation, source })
}

fn transport(operation: &'static str) -> impl FnOnce(reqwest::Error) -> EngineError {
    move |source| EngineError::Transport { operation, source }
}

#[async_trait]
impl ProcessEngine for RestEngineClient {
    async fn health(&self) -> Result<(), EngineError> {
        const OP: &str = "engine health";
        let resp = self
            .client
            .get(self.url("/engine"))
            .send()
            .await
            .map_err(transport(OP))?;
        ok_body(OP, resp).await?;
        Ok(())
    }

    async fn create_deployment(&self, req: &DeploymentRequest) -> Result<Deployment, EngineError> {
        const OP: &str = "create deployment";
        let form = Form::new()
            .text("deployment-name", req.deployment_name.clone())
            .text(
                "enable-duplicate-filtering",
                req.enable_duplicate_filtering.to_string(),
            )
            .text("deploy-changed-only", req.deploy_changed_only.to_string())
            .text("deployment-source", req.source.clone())
            .part(
                req.resource_name.clone(),
                Part::bytes(req.content.clone()).file_name(req.resource_name.clone()),
            );

        debug!(deployment = %req.deployment_name, bytes = req.content.len(), "creating deployment");
        let resp = self
            .client
            .post(self.url("/deployment/create"))
            .multipart(form)
            .send()
            .await
            .map_err(transport(OP))?;
        let body = ok_body(OP, resp).await?;
        decode(OP, &body)
    }

    async fn definitions_for_deployment(
        &self,
        deployment_id: &str,
    ) -> Result<Vec<ProcessDefinition>, EngineError> {
        const OP: &str = "find process definition";
        let resp = self
            .client
            .get(self.url("/process-definition"))
            .query(&[("deploymentId", deployment_id)])
            .send()
            .await
            .map_err(transport(OP))?;
        let body = ok_body(OP, resp).await?;
        decode(OP, &body)
    }

    async fn start_instance(
        &self,
        definition: &ProcessDefinitionId,
    ) -> Result<ProcessInstance, EngineError> {
        const OP: &str = "start instance";
        let resp = self
            .client
            .post(self.url(&format!("/process-definition/{definition}/start")))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(transport(OP))?;
        let body = ok_body(OP, resp).await?;
        decode(OP, &body)
    }

    async fn instance_history(
        &self,
        instance: &ProcessInstanceId,
    ) -> Result<HistoricProcessInstance, EngineError> {
        const OP: &str = "fetch history";
        let resp = self
            .client
            .get(self.url(&format!("/history/process-instance/{instance}")))
            .timeout(self.history_timeout)
            .send()
            .await
            .map_err(transport(OP))?;
        let body = ok_body(OP, resp).await?;
        decode(OP, &body)
    }
}
