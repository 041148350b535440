//! Test helper utilities for conformance harness tests
//!
//! This module provides reusable stack-shaped response bodies and helper
//! functions that are shared across multiple test modules.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use inference_conformance::config::StackConfig;
use inference_conformance::retry::RetryPolicy;
use inference_conformance::StackClient;
use std::time::Duration;
use wiremock::ResponseTemplate;

pub const TEST_MODEL_ID: &str = "meta-llama/Llama-3.1-8B-Instruct";

/// Create fast retry policy for tests (avoids long waits)
///
/// This retry policy has short delays suitable for tests with mock servers.
pub fn create_fast_test_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        backoff_multiplier: 2.0,
        request_timeout: Duration::from_secs(5),
        total_timeout: Duration::from_secs(10),
    }
}

/// Create retry policy with no retries (for deterministic testing)
pub fn create_no_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        initial_delay: Duration::from_millis(0),
        max_delay: Duration::from_millis(0),
        backoff_multiplier: 1.0,
        total_timeout: Duration::from_secs(5),
        request_timeout: Duration::from_secs(5),
    }
}

/// Create test configuration pointed at a mock server
///
/// # Arguments
///
/// * `base_url` - Base URL of the mock server (e.g., `mock_server.uri()`)
pub fn create_test_config(base_url: &str) -> StackConfig {
    StackConfig {
        base_url: base_url.to_string(),
        api_key: Some("test-stack-key".to_string()),
        text_model_id: TEST_MODEL_ID.to_string(),
        provider_type_override: None,
        retry_policy: create_fast_test_retry_policy(),
        turn_pause: Duration::ZERO,
    }
}

/// Create a stack client pointed at a mock server
///
/// # Panics
///
/// Panics if the configuration is rejected (test failure is appropriate).
pub fn create_test_client(base_url: &str) -> StackClient {
    StackClient::new(&create_test_config(base_url)).expect("Failed to create test stack client")
}

/// Create a stack client that never retries (for error-path assertions)
pub fn create_no_retry_client(base_url: &str) -> StackClient {
    let mut config = create_test_config(base_url);
    config.retry_policy = create_no_retry_policy();
    StackClient::new(&config).expect("Failed to create test stack client")
}

// ============================================================================
// Listing Response Helpers (for wiremock)
// ============================================================================

/// Create a `/v1/models` listing carrying the test model
pub fn create_model_listing() -> serde_json::Value {
    serde_json::json!({
        "data": [{
            "identifier": TEST_MODEL_ID,
            "provider_resource_id": "llama-3p1-8b",
            "provider_id": "test-provider",
            "metadata": {}
        }]
    })
}

/// Create a `/v1/providers` listing with the given provider type
pub fn create_provider_listing(provider_type: &str) -> serde_json::Value {
    serde_json::json!({
        "data": [{
            "provider_id": "test-provider",
            "provider_type": provider_type
        }]
    })
}

// ============================================================================
// Completion Response Helpers (for wiremock)
// ============================================================================

/// Create successful completion response
pub fn create_completion_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "content": content,
        "stop_reason": "out_of_tokens"
    })
}

/// Create completion response with one logprob entry per generated token
pub fn create_completion_response_with_logprobs(content: &str) -> serde_json::Value {
    serde_json::json!({
        "content": content,
        "stop_reason": "out_of_tokens",
        "logprobs": [
            {"logprobs_by_token": {" blue": -0.05}},
            {"logprobs_by_token": {",": -0.31}},
            {"logprobs_by_token": {" violets": -0.12}}
        ]
    })
}

/// Create successful chat-completion response with plain text content
pub fn create_chat_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "completion_message": {
            "role": "assistant",
            "content": content,
            "stop_reason": "end_of_turn",
            "tool_calls": []
        }
    })
}

/// Create chat-completion response carrying one tool call
pub fn create_chat_response_with_tool_call(
    tool_name: &str,
    arguments: serde_json::Value,
) -> serde_json::Value {
    serde_json::json!({
        "completion_message": {
            "role": "assistant",
            "content": "",
            "stop_reason": "end_of_turn",
            "tool_calls": [{
                "call_id": "call_test123",
                "tool_name": tool_name,
                "arguments": arguments
            }]
        }
    })
}

// ============================================================================
// SSE Body Helpers (for streaming tests)
// ============================================================================

/// Frame JSON payloads as an SSE body with a `[DONE]` terminator
pub fn create_sse_body(frames: &[serde_json::Value]) -> String {
    let mut body = String::new();
    for frame in frames {
        body.push_str("data: ");
        body.push_str(&frame.to_string());
        body.push_str("\n\n");
    }
    body.push_str("data: [DONE]\n\n");
    body
}

/// Create an SSE response template with the correct content type
pub fn create_sse_response(frames: &[serde_json::Value]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(create_sse_body(frames))
}

/// Create one completion stream chunk
pub fn create_completion_chunk(delta: &str, stop_reason: Option<&str>) -> serde_json::Value {
    match stop_reason {
        Some(reason) => serde_json::json!({"delta": delta, "stop_reason": reason}),
        None => serde_json::json!({"delta": delta}),
    }
}

/// Create one completion stream chunk carrying a logprob entry
pub fn create_completion_chunk_with_logprobs(delta: &str, logprob: f64) -> serde_json::Value {
    serde_json::json!({
        "delta": delta,
        "logprobs": [{"logprobs_by_token": {delta: logprob}}]
    })
}

/// Create one chat stream event with a text delta
pub fn create_chat_text_event(event_type: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "event": {
            "event_type": event_type,
            "delta": {"type": "text", "text": text}
        }
    })
}

/// Create one chat stream event with a successfully parsed tool-call delta
pub fn create_chat_tool_call_event(
    tool_name: &str,
    arguments: serde_json::Value,
) -> serde_json::Value {
    serde_json::json!({
        "event": {
            "event_type": "progress",
            "delta": {
                "type": "tool_call",
                "parse_status": "succeeded",
                "tool_call": {
                    "call_id": "call_test123",
                    "tool_name": tool_name,
                    "arguments": arguments
                }
            }
        }
    })
}

/// Create one chat stream event with a failed tool-call delta (raw text)
pub fn create_chat_failed_tool_call_event(raw: &str) -> serde_json::Value {
    serde_json::json!({
        "event": {
            "event_type": "progress",
            "delta": {
                "type": "tool_call",
                "parse_status": "failed",
                "tool_call": raw
            }
        }
    })
}

// ============================================================================
// Error Response Helpers (for wiremock)
// ============================================================================

/// Create error response template for wiremock
pub fn create_error_response(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({
        "error": {
            "message": message,
            "type": "api_error"
        }
    }))
}

/// Create 401 authentication error response
pub fn create_auth_error_response() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(serde_json::json!({
        "error": {
            "message": "Invalid API key",
            "type": "authentication_error"
        }
    }))
}

/// Create 429 rate limit error response with retry-after header
pub fn create_rate_limit_response() -> ResponseTemplate {
    ResponseTemplate::new(429)
        .insert_header("retry-after", "60")
        .set_body_json(serde_json::json!({
            "error": {
                "message": "Rate limit exceeded",
                "type": "rate_limit_error"
            }
        }))
}

/// Create 500 server error response
pub fn create_server_error_response() -> ResponseTemplate {
    ResponseTemplate::new(500).set_body_json(serde_json::json!({
        "error": {
            "message": "Internal server error",
            "type": "server_error"
        }
    }))
}
