//! OpenAI client tests against a local mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use textcad::core::types::Source;
use textcad::parse::assist::{AssistError, Assistant, StaticSettings};
use textcad::parse::openai::{OpenAiAssistant, OpenAiConfig};
use textcad::parse::Normalizer;

fn assistant(server: &MockServer) -> OpenAiAssistant {
    OpenAiAssistant::new(OpenAiConfig {
        api_key: "sk-test".to_string(),
        base_url: format!("{}/v1/", server.uri()),
        model: "gpt-4o".to_string(),
        max_tokens: 500,
    })
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

#[tokio::test]
async fn posts_chat_completion_and_reads_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "gpt-4o", "max_tokens": 500 })))
        .respond_with(completion("{\"action\": \"fillet\"}"))
        .expect(1)
        .mount(&server)
        .await;

    let reply = assistant(&server).complete("round the edges").await.unwrap();
    assert_eq!(reply, "{\"action\": \"fillet\"}");
}

#[tokio::test]
async fn error_status_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = assistant(&server).complete("anything").await.unwrap_err();
    assert_eq!(
        err,
        AssistError::Api {
            status: 429,
            message: "rate limited".to_string(),
        }
    );
}

#[tokio::test]
async fn blank_content_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("   "))
        .mount(&server)
        .await;

    let err = assistant(&server).complete("anything").await.unwrap_err();
    assert_eq!(err, AssistError::EmptyResponse);
}

#[tokio::test]
async fn normalizer_accepts_valid_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(
            r#"{"action": "create_hole", "parameters": {"count": 3, "diameter_mm": 4.5}}"#,
        ))
        .mount(&server)
        .await;

    let normalizer = Normalizer::new(
        Box::new(StaticSettings::enabled()),
        Some(Box::new(assistant(&server))),
    );
    let resolved = normalizer.resolve("put three small holes in it", true).await;
    assert_eq!(resolved.source, Source::Assisted);
    assert_eq!(resolved.operation.parameters().count, Some(3));
    assert_eq!(resolved.operation.parameters().diameter_mm, Some(4.5));
}

#[tokio::test]
async fn slow_server_falls_back_to_rules() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("{}").set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;

    let settings = StaticSettings::enabled().with_timeout(Duration::from_millis(50));
    let normalizer = Normalizer::new(Box::new(settings), Some(Box::new(assistant(&server))));
    let resolved = normalizer.resolve("drill a 5mm hole", true).await;
    assert_eq!(resolved.source, Source::Deterministic);
    assert_eq!(resolved.operation.parameters().diameter_mm, Some(5.0));
}
