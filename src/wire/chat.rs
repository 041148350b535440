//! Chat-completion endpoint types
//!
//! Multi-turn, role-tagged generation: `POST /v1/inference/chat-completion`.
//! Covers tool definitions, tool choice, and JSON-schema structured output.

use super::completion::SamplingParams;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Message roles for chat interactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// One conversation message as sent on the wire.
///
/// A single shape covers all roles: `call_id` is only present on tool
/// responses, `tool_calls` only on assistant messages echoed back into the
/// history, `stop_reason` only on assistant messages the stack produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    /// Tool-call id this message answers (tool role only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

impl Message {
    /// Create a simple user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::simple(MessageRole::User, content)
    }

    /// Create a simple system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::simple(MessageRole::System, content)
    }

    /// Create a simple assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::simple(MessageRole::Assistant, content)
    }

    /// Create a tool response answering `call_id`
    pub fn tool_response(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            call_id: Some(call_id.into()),
            tool_calls: Vec::new(),
            stop_reason: None,
        }
    }

    fn simple(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            call_id: None,
            tool_calls: Vec::new(),
            stop_reason: None,
        }
    }
}

/// Tool call from an assistant reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub call_id: String,
    /// Name of the tool to call
    pub tool_name: String,
    /// Arguments to pass to the tool, as a JSON mapping
    pub arguments: serde_json::Value,
}

/// One parameter in a tool definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParamDefinition {
    pub param_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
    /// Element type for array parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<serde_json::Value>,
}

fn default_true() -> bool {
    true
}

/// Tool definition offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name - must be unique within a request
    pub tool_name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Parameter name -> definition; ordered for stable serialization
    #[serde(default)]
    pub parameters: BTreeMap<String, ToolParamDefinition>,
}

/// Tool choice strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide whether and which tools to use
    #[default]
    Auto,
    /// Must use at least one tool
    Required,
    /// Don't use any tools
    None,
}

/// Tool behavior configuration block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ToolConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

/// How tool definitions are rendered into the model prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolPromptFormat {
    Json,
    PythonList,
}

/// Response format specification for structured output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonSchema { json_schema: serde_json::Value },
}

impl ResponseFormat {
    pub fn json_schema(schema: serde_json::Value) -> Self {
        Self::JsonSchema {
            json_schema: schema,
        }
    }
}

/// Request body for `POST /v1/inference/chat-completion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model_id: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_prompt_format: Option<ToolPromptFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_params: Option<SamplingParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatCompletionRequest {
    /// Non-streaming request with no tools.
    pub fn new(model_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model_id: model_id.into(),
            messages,
            stream: false,
            tools: None,
            tool_choice: None,
            tool_config: None,
            tool_prompt_format: None,
            sampling_params: None,
            response_format: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    pub fn with_tool_config(mut self, config: ToolConfig) -> Self {
        self.tool_config = Some(config);
        self
    }

    pub fn with_tool_prompt_format(mut self, format: ToolPromptFormat) -> Self {
        self.tool_prompt_format = Some(format);
        self
    }

    pub fn with_sampling_params(mut self, params: SamplingParams) -> Self {
        self.sampling_params = Some(params);
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

/// Assistant reply in a non-streaming chat-completion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl From<CompletionMessage> for Message {
    fn from(msg: CompletionMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content,
            call_id: None,
            tool_calls: msg.tool_calls,
            stop_reason: msg.stop_reason,
        }
    }
}

/// Non-streaming chat-completion response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub completion_message: CompletionMessage,
}
