//! Chat-completion stream chunk types
//!
//! Streamed chat replies arrive as SSE frames, each wrapping one event with
//! either a text delta or a tool-call delta. Tool-call deltas carry a parse
//! status: the stack accumulates raw model output until it either parses into
//! a [`ToolCall`] (`succeeded`) or is given up on (`failed`, raw text kept).

use super::chat::ToolCall;
use serde::{Deserialize, Serialize};

/// Stream event lifecycle marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatEventType {
    Start,
    Progress,
    Complete,
}

/// Parse status of an in-flight tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallParseStatus {
    Started,
    InProgress,
    Succeeded,
    Failed,
}

/// Tool-call payload of a delta: a parsed call once complete, otherwise the
/// raw accumulated text. `Parsed` must come first so untagged deserialization
/// prefers the structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolCallDelta {
    Parsed(ToolCall),
    Raw(String),
}

impl ToolCallDelta {
    pub fn as_parsed(&self) -> Option<&ToolCall> {
        match self {
            Self::Parsed(call) => Some(call),
            Self::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Self::Parsed(_) => None,
            Self::Raw(text) => Some(text),
        }
    }
}

/// Content delta inside one stream event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentDelta {
    Text {
        text: String,
    },
    ToolCall {
        tool_call: ToolCallDelta,
        parse_status: ToolCallParseStatus,
    },
}

/// One chat-completion stream event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionEvent {
    pub event_type: ChatEventType,
    pub delta: ContentDelta,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

/// SSE frame envelope for chat-completion streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub event: ChatCompletionEvent,
}
