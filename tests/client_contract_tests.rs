//! Contract tests for the stack client against a mock server
//!
//! Verifies the client's HTTP behavior with wiremock: endpoint paths,
//! request bodies, authentication headers, response parsing, and the
//! mapping of non-success statuses onto harness errors. No live stack
//! is involved; streaming behavior is covered separately.

mod common;

use common::*;
use inference_conformance::wire::{
    ChatCompletionRequest, CompletionRequest, Message, ResponseFormat, SamplingParams,
};
use inference_conformance::ConformanceError;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Listings
// ============================================================================

#[tokio::test]
async fn test_list_models_parses_listing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("authorization", "Bearer test-stack-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_model_listing()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let models = client.list_models().await.unwrap();

    assert_eq!(models.len(), 1);
    assert_eq!(models[0].identifier, TEST_MODEL_ID);
    assert_eq!(models[0].provider_resource_id.as_deref(), Some("llama-3p1-8b"));
    assert_eq!(models[0].provider_id, "test-provider");
}

#[tokio::test]
async fn test_list_providers_parses_listing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/providers"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(create_provider_listing("remote::vllm")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let providers = client.list_providers().await.unwrap();

    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].provider_type, "remote::vllm");
}

// ============================================================================
// Completion
// ============================================================================

#[tokio::test]
async fn test_completion_posts_expected_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inference/completion"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "model_id": TEST_MODEL_ID,
            "content": "Complete the sentence using one word: Roses are red, violets are ",
            "stream": false,
            "sampling_params": {"max_tokens": 50}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_completion_response(" blue")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let request = CompletionRequest::new(
        TEST_MODEL_ID,
        "Complete the sentence using one word: Roses are red, violets are ",
    )
    .with_sampling_params(SamplingParams::with_max_tokens(50));

    let response = client.completion(request).await.unwrap();
    assert_eq!(response.content, " blue");
    assert_eq!(response.stop_reason.as_deref(), Some("out_of_tokens"));
}

#[tokio::test]
async fn test_completion_forces_stream_off() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inference/completion"))
        .and(body_partial_json(serde_json::json!({"stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_completion_response("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    // A request built for streaming still goes out non-streaming here
    let request = CompletionRequest::new(TEST_MODEL_ID, "hello").streaming();
    client.completion(request).await.unwrap();
}

#[tokio::test]
async fn test_completion_with_logprobs_parses_annotations() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inference/completion"))
        .and(body_partial_json(serde_json::json!({"logprobs": {"top_k": 1}})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(create_completion_response_with_logprobs(" blue, violets")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let request = CompletionRequest::new(TEST_MODEL_ID, "Roses are red,").with_logprobs(1);

    let response = client.completion(request).await.unwrap();
    let logprobs = response.logprobs.unwrap();
    assert_eq!(logprobs.len(), 3);
    for entry in &logprobs {
        assert_eq!(entry.logprobs_by_token.len(), 1);
    }
}

// ============================================================================
// Chat Completion
// ============================================================================

#[tokio::test]
async fn test_chat_completion_posts_messages() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inference/chat-completion"))
        .and(body_partial_json(serde_json::json!({
            "model_id": TEST_MODEL_ID,
            "messages": [{"role": "user", "content": "Which planet do humans live on?"}],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_chat_response("Earth")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let request = ChatCompletionRequest::new(
        TEST_MODEL_ID,
        vec![Message::user("Which planet do humans live on?")],
    );

    let response = client.chat_completion(request).await.unwrap();
    assert_eq!(response.completion_message.content, "Earth");
}

#[tokio::test]
async fn test_chat_completion_parses_tool_call() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inference/chat-completion"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            create_chat_response_with_tool_call(
                "get_weather",
                serde_json::json!({"location": "San Francisco, CA"}),
            ),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let request =
        ChatCompletionRequest::new(TEST_MODEL_ID, vec![Message::user("Weather in SF?")]);

    let response = client.chat_completion(request).await.unwrap();
    let msg = response.completion_message;
    assert!(msg.content.is_empty());
    assert_eq!(msg.tool_calls.len(), 1);
    assert_eq!(msg.tool_calls[0].tool_name, "get_weather");
    assert_eq!(msg.tool_calls[0].arguments["location"], "San Francisco, CA");
}

#[tokio::test]
async fn test_chat_completion_sends_response_format() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inference/chat-completion"))
        .and(body_partial_json(serde_json::json!({
            "response_format": {
                "type": "json_schema",
                "json_schema": {"type": "object"}
            }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(create_chat_response(r#"{"first_name": "Michael"}"#)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let request = ChatCompletionRequest::new(TEST_MODEL_ID, vec![Message::user("Tell me about MJ")])
        .with_response_format(ResponseFormat::json_schema(serde_json::json!({"type": "object"})));

    client.chat_completion(request).await.unwrap();
}

// ============================================================================
// Error Mapping
// ============================================================================

#[tokio::test]
async fn test_401_maps_to_authentication_failed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inference/completion"))
        .respond_with(create_auth_error_response())
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_no_retry_client(&mock_server.uri());
    let err = client
        .completion(CompletionRequest::new(TEST_MODEL_ID, "hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConformanceError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn test_429_maps_to_rate_limit_with_retry_after() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inference/completion"))
        .respond_with(create_rate_limit_response())
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_no_retry_client(&mock_server.uri());
    let err = client
        .completion(CompletionRequest::new(TEST_MODEL_ID, "hello"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConformanceError::RateLimitExceeded {
            retry_after_seconds: 60
        }
    ));
}

#[tokio::test]
async fn test_500_is_retried_then_surfaced() {
    let mock_server = MockServer::start().await;
    // Fast policy allows 2 attempts; both must hit the server
    Mock::given(method("POST"))
        .and(path("/v1/inference/completion"))
        .respond_with(create_server_error_response())
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let err = client
        .completion(CompletionRequest::new(TEST_MODEL_ID, "hello"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConformanceError::RequestFailed {
            status: Some(500),
            ..
        }
    ));
}

#[tokio::test]
async fn test_500_recovers_on_retry() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inference/completion"))
        .respond_with(create_server_error_response())
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/inference/completion"))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_completion_response("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let response = client
        .completion(CompletionRequest::new(TEST_MODEL_ID, "hello"))
        .await
        .unwrap();
    assert_eq!(response.content, "ok");
}

#[tokio::test]
async fn test_malformed_body_maps_to_parsing_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inference/completion"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_no_retry_client(&mock_server.uri());
    let err = client
        .completion(CompletionRequest::new(TEST_MODEL_ID, "hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConformanceError::ResponseParsingError { .. }));
}

#[tokio::test]
async fn test_connection_failure_maps_to_request_failed() {
    // Bind a server to grab a free port, then drop it so nothing listens.
    // A dedicated (non-pooled) server is required: pooled servers from
    // `MockServer::start()` keep their socket listening after drop.
    let dead_uri = {
        let mock_server = MockServer::builder().start().await;
        mock_server.uri()
    };

    let client = create_no_retry_client(&dead_uri);
    let err = client
        .completion(CompletionRequest::new(TEST_MODEL_ID, "hello"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConformanceError::RequestFailed { status: None, .. }
    ));
}

#[tokio::test]
async fn test_per_call_timeout_maps_to_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inference/chat-completion"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(create_chat_response("slow"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = create_no_retry_client(&mock_server.uri());
    let request = ChatCompletionRequest::new(TEST_MODEL_ID, vec![Message::user("hello")]);
    let err = client
        .chat_completion_with_timeout(request, Some(Duration::from_millis(50)))
        .await
        .unwrap_err();

    assert!(matches!(err, ConformanceError::Timeout { .. }));
}
