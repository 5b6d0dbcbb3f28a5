use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use engine_loadtest::engine::{
    DeploymentRequest, EngineError, ProcessDefinitionId, ProcessEngine, ProcessInstanceId,
    RestEngineClient,
};

use super::mock_engine::MockEngine;

fn client_for(engine: &MockEngine) -> RestEngineClient {
    RestEngineClient::new(
        &engine.base_url(),
        Duration::from_secs(5),
        Duration::from_millis(300),
    )
    .unwrap()
}

#[tokio::test]
async fn test_health_expects_200() {
    let engine = MockEngine::start().await;
    engine.healthy().await;

    client_for(&engine).health().await.unwrap();
}

#[tokio::test]
async fn test_health_other_success_status_is_unavailable() {
    let engine = MockEngine::start().await;
    Mock::given(method("GET"))
        .and(path(MockEngine::rest("/engine")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&engine.server)
        .await;

    let err = client_for(&engine).health().await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(204));
}

#[tokio::test]
async fn test_create_deployment_sends_multipart_form() {
    let engine = MockEngine::start().await;
    Mock::given(method("POST"))
        .and(path(MockEngine::rest("/deployment/create")))
        .and(body_string_contains("name=\"deployment-name\""))
        .and(body_string_contains("order.bpmn"))
        .and(body_string_contains("name=\"enable-duplicate-filtering\""))
        .and(body_string_contains("name=\"deploy-changed-only\""))
        .and(body_string_contains("name=\"deployment-source\""))
        .and(body_string_contains("senergy"))
        .and(body_string_contains("name=\"test.bpmn\""))
        .and(body_string_contains("<definitions id=\"order\"/>"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "dep-42" })))
        .expect(1)
        .mount(&engine.server)
        .await;

    let req = DeploymentRequest {
        deployment_name: "order.bpmn".to_string(),
        source: "senergy".to_string(),
        enable_duplicate_filtering: true,
        deploy_changed_only: true,
        resource_name: "test.bpmn".to_string(),
        content: b"<definitions id=\"order\"/>".to_vec(),
    };
    let deployment = client_for(&engine).create_deployment(&req).await.unwrap();
    assert_eq!(deployment.id, "dep-42");
}

#[tokio::test]
async fn test_definition_lookup_filters_by_deployment() {
    let engine = MockEngine::start().await;
    engine.deploys("dep-7", "order:3:abc").await;

    let defs = client_for(&engine)
        .definitions_for_deployment("dep-7")
        .await
        .unwrap();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].id, ProcessDefinitionId::from("order:3:abc"));
}

#[tokio::test]
async fn test_start_instance_posts_empty_json() {
    let engine = MockEngine::start().await;
    Mock::given(method("POST"))
        .and(path(MockEngine::rest("/process-definition/order:3:abc/start")))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "inst-1" })))
        .expect(1)
        .mount(&engine.server)
        .await;

    let instance = client_for(&engine)
        .start_instance(&ProcessDefinitionId::from("order:3:abc"))
        .await
        .unwrap();
    assert_eq!(instance.id, ProcessInstanceId::from("inst-1"));
}

#[tokio::test]
async fn test_start_instance_error_keeps_body() {
    let engine = MockEngine::start().await;
    Mock::given(method("POST"))
        .and(path(MockEngine::rest("/process-definition/broken/start")))
        .respond_with(ResponseTemplate::new(500).set_body_string("engine exploded"))
        .mount(&engine.server)
        .await;

    let err = client_for(&engine)
        .start_instance(&ProcessDefinitionId::from("broken"))
        .await
        .unwrap_err();
    match err {
        EngineError::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "engine exploded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_undecodable_response() {
    let engine = MockEngine::start().await;
    Mock::given(method("GET"))
        .and(path(MockEngine::rest("/process-definition")))
        .and(query_param("deploymentId", "dep-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&engine.server)
        .await;

    let err = client_for(&engine)
        .definitions_for_deployment("dep-1")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Decode { .. }));
}

#[tokio::test]
async fn test_history_read() {
    let engine = MockEngine::start().await;
    engine
        .history("2020-01-01T00:00:00.000+0000", "2020-01-01T00:00:10.000+0000")
        .await;

    let hist = client_for(&engine)
        .instance_history(&ProcessInstanceId::from("inst-9"))
        .await
        .unwrap();
    assert_eq!(hist.start_time, "2020-01-01T00:00:00.000+0000");
    assert_eq!(hist.end_time.as_deref(), Some("2020-01-01T00:00:10.000+0000"));
}

#[tokio::test]
async fn test_history_read_times_out() {
    let engine = MockEngine::start().await;
    Mock::given(method("GET"))
        .and(path(MockEngine::rest("/history/process-instance/slow")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(json!({ "id": "slow", "startTime": "2020-01-01T00:00:00Z" })),
        )
        .mount(&engine.server)
        .await;

    let err = client_for(&engine)
        .instance_history(&ProcessInstanceId::from("slow"))
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err}");
}
