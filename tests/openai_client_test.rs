use factkeeper::config::LlmConfig;
use factkeeper::llm::openai::OpenAiClient;
use factkeeper::llm::{GenerateOptions, LlmClient, LlmError};
use factkeeper::pipeline::ProcessingLog;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAiClient {
    let config = LlmConfig {
        base_url: server.uri(),
        ..LlmConfig::default()
    };
    OpenAiClient::new(&config, "test-key".into()).unwrap()
}

fn options() -> GenerateOptions {
    GenerateOptions::from_config(&LlmConfig::default())
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }],
        "usage": { "prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160 }
    })
}

#[tokio::test]
async fn returns_first_choice_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({ "model": "gpt-4o", "max_tokens": 4000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("| 1 | A | 2025-06-18 |")))
        .expect(1)
        .mount(&server)
        .await;

    let mut log = ProcessingLog::new();
    let reply = client_for(&server)
        .generate("prompt", &options(), &mut log)
        .await
        .unwrap();

    assert_eq!(reply, "| 1 | A | 2025-06-18 |");
    let messages: Vec<&str> = log.entries().iter().map(|e| e.message.as_str()).collect();
    assert!(messages[0].contains("prompt_chars=6"));
    assert!(messages[1].contains("total_tokens=160"));
    assert!(messages.iter().all(|m| !m.contains("test-key")));
}

#[tokio::test]
async fn too_many_requests_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "20"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate("prompt", &options(), &mut ProcessingLog::new())
        .await
        .unwrap_err();
    assert_eq!(err, LlmError::RateLimited { retry_after_secs: Some(20) });
}

#[tokio::test]
async fn auth_failure_maps_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "bad key" })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate("prompt", &options(), &mut ProcessingLog::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "LLMUnavailable");
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn server_error_maps_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate("prompt", &options(), &mut ProcessingLog::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "LLMUnavailable");
}

#[tokio::test]
async fn empty_content_maps_to_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate("prompt", &options(), &mut ProcessingLog::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "LLMMalformedResponse");
}

#[tokio::test]
async fn undecodable_body_maps_to_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate("prompt", &options(), &mut ProcessingLog::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "LLMMalformedResponse");
}

#[tokio::test]
async fn unreachable_endpoint_maps_to_unavailable() {
    let config = LlmConfig {
        base_url: "http://127.0.0.1:1".into(),
        ..LlmConfig::default()
    };
    let client = OpenAiClient::new(&config, "test-key".into()).unwrap();

    let err = client
        .generate("prompt", &options(), &mut ProcessingLog::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "LLMUnavailable");
}
