mod helpers;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use factkeeper::config::FactkeeperConfig;
use factkeeper::knowledge::render_markdown;
use factkeeper::llm::{LlmClient, LlmError};
use factkeeper::server::{router, AppState};
use factkeeper::source::fixture::FixtureSource;
use helpers::{gapped_kb, ScriptedClient};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Config that passes the configuration check without an API key.
fn replay_config() -> FactkeeperConfig {
    let mut config = FactkeeperConfig::default();
    config.llm.provider = "replay".into();
    config.llm.replay_path = Some("/unused".into());
    config
}

fn state(client: Option<Arc<ScriptedClient>>) -> AppState {
    AppState::new(
        replay_config(),
        client.map(|c| c as Arc<dyn LlmClient>),
        Arc::new(FixtureSource),
    )
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn process_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn request_body() -> Value {
    json!({
        "guidelines": "Keep facts current.",
        "current_knowledge_base": gapped_kb(),
        "slack_message": { "content": "ARR: $8.7M", "channel": "#atlas-updates" }
    })
}

#[tokio::test]
async fn index_lists_endpoints() {
    let app = router(state(None));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["service"], "factkeeper");
    assert!(body["endpoints"]["POST /process"].is_string());
}

#[tokio::test]
async fn health_is_ok_when_every_component_passes() {
    let app = router(state(Some(ScriptedClient::replying("pong"))));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["overall_status"], "healthy");
    assert_eq!(body["components"]["llm"]["status"], "healthy");
}

#[tokio::test]
async fn health_is_unavailable_when_llm_fails() {
    let client = ScriptedClient::failing(LlmError::Unavailable("down".into()));
    let app = router(state(Some(client)));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["overall_status"], "degraded");
    assert_eq!(body["components"]["llm"]["status"], "unhealthy");
}

#[tokio::test]
async fn process_returns_updated_knowledge_base() {
    let mut updated = gapped_kb();
    updated.facts[2].description = "ARR target is $10.6M by EOQ2 2025. ARR is $8.7M.".into();
    updated.facts[2].last_validated = helpers::today();
    let client = ScriptedClient::replying(render_markdown(&updated));

    let response = router(state(Some(client)))
        .oneshot(process_request(request_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["final_state"], "VALIDATED");
    assert_eq!(body["changes"]["updated"][0]["number"], 6);
    assert!(body["updated_knowledge_base_markdown"]
        .as_str()
        .unwrap()
        .contains("ARR is $8.7M"));
    assert!(body["log"].as_array().unwrap().len() > 5);
}

#[tokio::test]
async fn process_failure_returns_input_and_error() {
    let client = ScriptedClient::failing(LlmError::MalformedResponse("no text".into()));

    let response = router(state(Some(client)))
        .oneshot(process_request(request_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["kind"], "LLMMalformedResponse");
    assert_eq!(body["updated_knowledge_base"], json!(gapped_kb()));
}

#[tokio::test]
async fn process_without_client_is_unavailable() {
    let response = router(state(None))
        .oneshot(process_request(request_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn process_source_uses_configured_inputs() {
    let client = ScriptedClient::replying(render_markdown(&FixtureSource::knowledge_base()));

    let response = router(state(Some(client.clone())))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/process/source")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let prompts = client.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("#atlas-updates"));
}
