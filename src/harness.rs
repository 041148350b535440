//! Test orchestration helpers
//!
//! The one piece of the suite that is more than issue-and-assert: the
//! multi-turn tool-calling loop. [`MultiTurnDriver`] plays a fixture's
//! conversation against the stack, feeding canned tool outputs back after
//! each tool-call turn, and hands the per-turn transcript to the caller for
//! assertion. Also home to the stream-collection helpers shared by the
//! streaming suites.

use crate::client::StackClient;
use crate::error::{ConformanceError, ConformanceResult};
use crate::fixtures::{CannedToolResponse, TestCase};
use crate::logging::log_debug;
use crate::wire::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ContentDelta, Message,
    MessageRole, SamplingParams, SamplingStrategy, ToolCall, ToolCallParseStatus, ToolDefinition,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

/// Seam between the harness and the chat-completion endpoint.
///
/// The multi-turn driver only needs non-streaming chat issuance; keeping the
/// seam this narrow lets unit tests script assistant replies without a stack.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn chat(
        &self,
        request: ChatCompletionRequest,
    ) -> ConformanceResult<ChatCompletionResponse>;
}

#[async_trait]
impl ChatApi for StackClient {
    async fn chat(
        &self,
        request: ChatCompletionRequest,
    ) -> ConformanceResult<ChatCompletionResponse> {
        self.chat_completion(request).await
    }
}

/// What the assistant did on one turn of the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRecord {
    pub tool_calls: Vec<ToolCall>,
    pub content: String,
    pub role: MessageRole,
}

/// Drives a fixture's multi-turn tool-calling conversation.
///
/// Loop shape: while fixture batches remain, or the last history message is a
/// tool response, issue one non-streaming chat-completion with the
/// accumulated history and the fixture's tools. A tool-call reply gets the
/// next canned tool output appended to the history; any other reply ends the
/// current exchange. A fixed pause follows each turn to respect provider
/// rate limits.
pub struct MultiTurnDriver {
    model_id: String,
    tools: Vec<ToolDefinition>,
    batches: VecDeque<Vec<Message>>,
    tool_responses: VecDeque<CannedToolResponse>,
    sampling_params: SamplingParams,
    turn_pause: Duration,
}

impl MultiTurnDriver {
    /// Build a driver from a multi-turn fixture.
    pub fn from_fixture(model_id: impl Into<String>, tc: &TestCase) -> ConformanceResult<Self> {
        Ok(Self {
            model_id: model_id.into(),
            tools: tc.tools()?,
            batches: tc.message_batches()?.into(),
            tool_responses: tc.tool_responses()?.into(),
            sampling_params: SamplingParams {
                strategy: Some(SamplingStrategy::TopP {
                    temperature: 0.6,
                    top_p: 0.9,
                }),
                ..SamplingParams::default()
            },
            turn_pause: Duration::from_secs(1),
        })
    }

    /// Override the pause between turns. Unit tests set this to zero.
    pub fn with_turn_pause(mut self, pause: Duration) -> Self {
        self.turn_pause = pause;
        self
    }

    /// Run the loop to completion, returning one record per assistant turn.
    pub async fn run(mut self, api: &dyn ChatApi) -> ConformanceResult<Vec<TurnRecord>> {
        let mut messages: Vec<Message> = Vec::new();
        let mut turns = Vec::new();

        while !self.batches.is_empty() || last_is_tool_response(&messages) {
            // Do not take new messages while a tool response is pending
            if !last_is_tool_response(&messages) {
                if let Some(batch) = self.batches.pop_front() {
                    messages.extend(batch);
                }
            }

            let request = ChatCompletionRequest::new(self.model_id.clone(), messages.clone())
                .with_tools(self.tools.clone())
                .with_sampling_params(self.sampling_params.clone());

            let response = api.chat(request).await?;
            let reply = response.completion_message;

            log_debug!(
                turn = turns.len(),
                tool_calls = reply.tool_calls.len(),
                content_len = reply.content.len(),
                "Multi-turn assistant reply"
            );

            messages.push(reply.clone().into());

            if let Some(call) = reply.tool_calls.first() {
                let canned = self.tool_responses.pop_front().ok_or_else(|| {
                    ConformanceError::fixture_missing(format!(
                        "canned tool responses exhausted before call to {}",
                        call.tool_name
                    ))
                })?;
                messages.push(Message::tool_response(call.call_id.clone(), canned.response));
            }

            turns.push(TurnRecord {
                tool_calls: reply.tool_calls,
                content: reply.content,
                role: reply.role,
            });

            if !self.turn_pause.is_zero() {
                tokio::time::sleep(self.turn_pause).await;
            }
        }

        Ok(turns)
    }
}

fn last_is_tool_response(messages: &[Message]) -> bool {
    messages
        .last()
        .is_some_and(|m| m.role == MessageRole::Tool)
}

/// Render one tool call as `[name, {args}]` for transcript comparison.
pub fn render_tool_invocation(call: &ToolCall) -> String {
    format!("[{}, {}]", call.tool_name, call.arguments)
}

/// Concatenate the renderings of all successfully parsed tool-call deltas.
///
/// Text deltas and in-flight (started/in-progress/failed) tool-call deltas
/// contribute nothing; an empty result means no tool invocation surfaced.
pub fn extract_tool_invocation_content(chunks: &[ChatCompletionChunk]) -> String {
    let mut content = String::new();
    for chunk in chunks {
        if let ContentDelta::ToolCall {
            tool_call,
            parse_status,
        } = &chunk.event.delta
        {
            if *parse_status == ToolCallParseStatus::Succeeded {
                if let Some(call) = tool_call.as_parsed() {
                    content.push_str(&render_tool_invocation(call));
                }
            }
        }
    }
    content
}

/// Concatenate all text deltas from a chat-completion stream transcript.
pub fn collect_stream_text(chunks: &[ChatCompletionChunk]) -> String {
    let mut text = String::new();
    for chunk in chunks {
        if let ContentDelta::Text { text: delta } = &chunk.event.delta {
            text.push_str(delta);
        }
    }
    text
}
