#![allow(dead_code)]
use serde_json::json;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use engine_loadtest::Config;

pub const REST_ROOT: &str = "/engine-rest";

/// Hands out `inst-0`, `inst-1`, ... one per start request.
pub struct SequentialInstances {
    next: AtomicUsize,
}

impl SequentialInstances {
    pub fn new() -> Self {
        Self {
            next: AtomicUsize::new(0),
        }
    }
}

impl Respond for SequentialInstances {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        ResponseTemplate::new(200).set_body_json(json!({
            "id": format!("inst-{n}"),
            "definitionId": "noop:1:def",
            "ended": false
        }))
    }
}

/// Mock engine-rest API on a random local port.
pub struct MockEngine {
    pub server: MockServer,
}

impl MockEngine {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}{}", self.server.uri(), REST_ROOT)
    }

    pub fn rest(path: &str) -> String {
        format!("{REST_ROOT}{path}")
    }

    pub async fn healthy(&self) {
        Mock::given(method("GET"))
            .and(path(Self::rest("/engine")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "default" }])))
            .mount(&self.server)
            .await;
    }

    /// Every deployment gets `deployment_id` and resolves to `definition_id`.
    pub async fn deploys(&self, deployment_id: &str, definition_id: &str) {
        Mock::given(method("POST"))
            .and(path(Self::rest("/deployment/create")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": deployment_id,
                "name": "model",
                "source": "senergy"
            })))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(Self::rest("/process-definition")))
            .and(query_param("deploymentId", deployment_id))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": definition_id,
                "key": "loadtest_noop",
                "version": 1,
                "deploymentId": deployment_id
            }])))
            .mount(&self.server)
            .await;
    }

    pub async fn starts_sequentially(&self, definition_id: &str) {
        Mock::given(method("POST"))
            .and(path(Self::rest(&format!("/process-definition/{definition_id}/start"))))
            .respond_with(SequentialInstances::new())
            .mount(&self.server)
            .await;
    }

    /// Every history read reports the same start and end time.
    pub async fn history(&self, start: &str, end: &str) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/engine-rest/history/process-instance/[^/]+$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "ignored",
                "startTime": start,
                "endTime": end,
                "state": "COMPLETED"
            })))
            .mount(&self.server)
            .await;
    }

    /// Paths of all history reads received so far.
    pub async fn history_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.url.path().to_string())
            .filter(|p| p.contains("/history/process-instance/"))
            .collect()
    }

    pub fn config(&self, models_dir: &Path, per_definition: usize) -> Config {
        let mut cfg = Config::default();
        cfg.engine.base_url = self.base_url();
        cfg.deployment.models_dir = models_dir.to_path_buf();
        cfg.load.instances_per_definition = per_definition;
        cfg.load.max_concurrency = 8;
        cfg.load.settle_seconds = 0;
        cfg
    }
}

pub fn models_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        std::fs::write(
            dir.path().join(name),
            format!("<definitions id=\"{name}\"/>"),
        )
        .unwrap();
    }
    dir
}
