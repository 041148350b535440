//! Thin wire client for the stack under test
//!
//! [`StackClient`] speaks the inference API's stable HTTP contract and
//! nothing more: model/provider listings, completion, and chat-completion,
//! each in non-streaming and streaming (SSE) variants. Assertions live in the
//! suites; this module only gets bytes on and off the wire faithfully.

use crate::config::StackConfig;
use crate::error::{ConformanceError, ConformanceResult};
use crate::logging::{log_debug, log_error};
use crate::retry::RetryExecutor;
use crate::wire::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, CompletionChunk,
    CompletionRequest, CompletionResponse, Model, ModelList, ProviderInfo, ProviderList,
};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// HTTP client bound to one stack deployment.
pub struct StackClient {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
    retry_executor: RetryExecutor,
}

impl StackClient {
    /// Create a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConformanceError::ConfigurationError`] if the configuration
    /// fails validation or the API key cannot be rendered into a header.
    pub fn new(config: &StackConfig) -> ConformanceResult<Self> {
        config.validate()?;

        let headers = Self::build_headers(config.api_key.as_deref())?;

        log_debug!(
            base_url = %config.normalized_base_url(),
            has_api_key = config.api_key.is_some(),
            "Creating stack client"
        );

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.normalized_base_url().to_string(),
            headers,
            retry_executor: RetryExecutor::new(config.retry_policy.clone()),
        })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> ConformanceResult<Self> {
        Self::new(&StackConfig::from_env()?)
    }

    fn build_headers(api_key: Option<&str>) -> ConformanceResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                    ConformanceError::configuration_error(format!("Invalid API key format: {e}"))
                })?,
            );
        }
        Ok(headers)
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// `GET /v1/models`
    pub async fn list_models(&self) -> ConformanceResult<Vec<Model>> {
        let list: ModelList = self.get_json("/v1/models").await?;
        Ok(list.data)
    }

    /// `GET /v1/providers`
    pub async fn list_providers(&self) -> ConformanceResult<Vec<ProviderInfo>> {
        let list: ProviderList = self.get_json("/v1/providers").await?;
        Ok(list.data)
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Non-streaming completion. The request's `stream` flag is forced off.
    pub async fn completion(
        &self,
        mut request: CompletionRequest,
    ) -> ConformanceResult<CompletionResponse> {
        request.stream = false;
        self.post_json("/v1/inference/completion", &request, None)
            .await
    }

    /// Streaming completion, decoded into [`CompletionChunk`]s.
    pub async fn completion_stream(
        &self,
        mut request: CompletionRequest,
    ) -> ConformanceResult<BoxStream<'static, ConformanceResult<CompletionChunk>>> {
        request.stream = true;
        let response = self
            .send_raw("/v1/inference/completion", &request, None)
            .await?;
        Ok(sse_json_stream(response))
    }

    // =========================================================================
    // Chat completion
    // =========================================================================

    /// Non-streaming chat completion.
    pub async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> ConformanceResult<ChatCompletionResponse> {
        self.chat_completion_with_timeout(request, None).await
    }

    /// Non-streaming chat completion with a per-call timeout override.
    ///
    /// Large conversation histories can exceed the policy's per-attempt
    /// timeout; this applies `timeout` to each attempt instead.
    pub async fn chat_completion_with_timeout(
        &self,
        mut request: ChatCompletionRequest,
        timeout: Option<Duration>,
    ) -> ConformanceResult<ChatCompletionResponse> {
        request.stream = false;
        self.post_json("/v1/inference/chat-completion", &request, timeout)
            .await
    }

    /// Streaming chat completion, decoded into [`ChatCompletionChunk`]s.
    pub async fn chat_completion_stream(
        &self,
        request: ChatCompletionRequest,
    ) -> ConformanceResult<BoxStream<'static, ConformanceResult<ChatCompletionChunk>>> {
        self.chat_completion_stream_with_timeout(request, None).await
    }

    /// Streaming chat completion with a per-call timeout override on the
    /// initial request (the body stream itself is not bounded).
    pub async fn chat_completion_stream_with_timeout(
        &self,
        mut request: ChatCompletionRequest,
        timeout: Option<Duration>,
    ) -> ConformanceResult<BoxStream<'static, ConformanceResult<ChatCompletionChunk>>> {
        request.stream = true;
        let response = self
            .send_raw("/v1/inference/chat-completion", &request, timeout)
            .await?;
        Ok(sse_json_stream(response))
    }

    // =========================================================================
    // Transport
    // =========================================================================

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ConformanceResult<T> {
        let url = format!("{}{}", self.base_url, path);
        self.retry_executor
            .execute(|| async {
                let response = self
                    .client
                    .get(&url)
                    .headers(self.headers.clone())
                    .send()
                    .await
                    .map_err(|e| {
                        log_error!(url = %url, error = %e, "HTTP request failed");
                        ConformanceError::request_failed(
                            format!("Request failed: {e}"),
                            None,
                            Some(Box::new(e)),
                        )
                    })?;
                parse_response(response).await
            })
            .await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> ConformanceResult<T> {
        self.retry_executor
            .execute(|| async {
                let response = self.send_raw(path, body, timeout).await?;
                parse_body(response).await
            })
            .await
    }

    /// Send one POST and map non-success statuses; leaves the body untouched
    /// so streaming callers can consume it incrementally.
    async fn send_raw<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> ConformanceResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .json(body);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            log_error!(url = %url, error = %e, "HTTP request failed");
            if e.is_timeout() {
                ConformanceError::timeout(timeout.map(|t| t.as_secs()).unwrap_or_default())
            } else {
                ConformanceError::request_failed(
                    format!("Request failed: {e}"),
                    None,
                    Some(Box::new(e)),
                )
            }
        })?;

        if !response.status().is_success() {
            return Err(handle_error_response(response).await);
        }
        Ok(response)
    }
}

/// Map a non-success HTTP response onto a [`ConformanceError`].
async fn handle_error_response(response: reqwest::Response) -> ConformanceError {
    let status = response.status();
    let headers = response.headers().clone();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    log_error!(
        status = %status,
        error_text = %error_text,
        "Stack error response"
    );

    match status.as_u16() {
        401 | 403 => ConformanceError::authentication_failed(error_text),
        429 => {
            let retry_after_seconds = headers
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            ConformanceError::rate_limit_exceeded(retry_after_seconds)
        }
        code => ConformanceError::request_failed(
            format!("Stack error {status}: {error_text}"),
            Some(code),
            None,
        ),
    }
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> ConformanceResult<T> {
    if !response.status().is_success() {
        return Err(handle_error_response(response).await);
    }
    parse_body(response).await
}

async fn parse_body<T: DeserializeOwned>(response: reqwest::Response) -> ConformanceResult<T> {
    let body = response.text().await.map_err(|e| {
        ConformanceError::request_failed(
            format!("Failed to read response body: {e}"),
            None,
            Some(Box::new(e)),
        )
    })?;
    serde_json::from_str(&body)
        .map_err(|e| ConformanceError::response_parsing_error(format!("{e}; body: {body}")))
}

/// Decode an SSE body into a stream of JSON payloads.
///
/// Frames are `data: {json}` lines; a `data: [DONE]` terminator is tolerated.
/// Byte chunks do not align with line boundaries, so incomplete lines are
/// buffered across chunks and any unterminated final line is flushed when the
/// body ends.
fn sse_json_stream<T: DeserializeOwned + Send + 'static>(
    response: reqwest::Response,
) -> BoxStream<'static, ConformanceResult<T>> {
    let line_buffer = Arc::new(Mutex::new(String::new()));

    response
        .bytes_stream()
        .map(Some)
        .chain(futures_util::stream::once(async { None }))
        .flat_map(move |event| {
            let items: Vec<ConformanceResult<T>> = match event {
                Some(Ok(bytes)) => {
                    let text = String::from_utf8_lossy(&bytes);
                    let mut buffer = line_buffer
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    buffer.push_str(&text);

                    let mut items = Vec::new();
                    while let Some(newline_pos) = buffer.find('\n') {
                        let line = buffer[..newline_pos].to_string();
                        buffer.drain(..=newline_pos);
                        items.extend(parse_sse_line(&line));
                    }
                    items
                }
                Some(Err(e)) => vec![Err(ConformanceError::request_failed(
                    format!("Stream read failed: {e}"),
                    None,
                    Some(Box::new(e)),
                ))],
                None => {
                    // Body ended; a final frame may lack its trailing newline
                    let mut buffer = line_buffer
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    let remainder = std::mem::take(&mut *buffer);
                    parse_sse_line(&remainder).into_iter().collect()
                }
            };
            futures_util::stream::iter(items)
        })
        .boxed()
}

/// Parse one SSE line into a decoded payload, an error, or nothing
/// (blank lines, comments, event names, and the `[DONE]` terminator).
fn parse_sse_line<T: DeserializeOwned>(line: &str) -> Option<ConformanceResult<T>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some(payload) = line.strip_prefix("data:") else {
        // Ignore SSE comments and event-name lines
        if line.starts_with(':') || line.starts_with("event:") {
            return None;
        }
        return Some(Err(ConformanceError::stream_protocol_error(format!(
            "Unexpected SSE line: {line}"
        ))));
    };

    let payload = payload.trim();
    if payload == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<T>(payload) {
        Ok(chunk) => Some(Ok(chunk)),
        Err(e) => Some(Err(ConformanceError::response_parsing_error(format!(
            "Bad stream chunk: {e}; payload: {payload}"
        )))),
    }
}
