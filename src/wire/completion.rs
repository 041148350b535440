//! Completion endpoint types
//!
//! Single-turn free-text generation: `POST /v1/inference/completion`.

use super::chat::ResponseFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sampling strategy selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SamplingStrategy {
    Greedy,
    TopP { temperature: f64, top_p: f64 },
}

/// Sampling parameters attached to completion and chat-completion requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SamplingParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<SamplingStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Stop sequences; generation halts before emitting any of these
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

impl SamplingParams {
    /// Params with only a token budget set.
    pub fn with_max_tokens(max_tokens: u32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            ..Self::default()
        }
    }
}

/// Log-probability request knob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogProbConfig {
    /// How many candidate tokens to annotate per generated token
    pub top_k: u32,
}

/// Per-token log-probability annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenLogProbs {
    /// Candidate token -> log-probability; carries `top_k` entries
    pub logprobs_by_token: HashMap<String, f64>,
}

/// Request body for `POST /v1/inference/completion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling_params: Option<SamplingParams>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<LogProbConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl CompletionRequest {
    /// Non-streaming request with default sampling.
    pub fn new(model_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            content: content.into(),
            sampling_params: None,
            stream: false,
            logprobs: None,
            response_format: None,
        }
    }

    pub fn with_sampling_params(mut self, params: SamplingParams) -> Self {
        self.sampling_params = Some(params);
        self
    }

    pub fn with_logprobs(mut self, top_k: u32) -> Self {
        self.logprobs = Some(LogProbConfig { top_k });
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }
}

/// Non-streaming completion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub logprobs: Option<Vec<TokenLogProbs>>,
}

/// One streamed completion chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionChunk {
    /// Text generated since the previous chunk; may be empty on the final chunk
    pub delta: String,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub logprobs: Option<Vec<TokenLogProbs>>,
}
