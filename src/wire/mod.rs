//! Wire contract types for the inference API under test
//!
//! Plain serde DTOs mirroring the stack's stable request/response formats.
//! These are consumed, not re-specified: the shapes belong to the external
//! system and this module only has to round-trip them faithfully.
//!
//! ## Organization
//! - `models` - model and provider listings
//! - `completion` - single-turn completion endpoint
//! - `chat` - chat-completion endpoint, tools, structured output
//! - `streaming` - chat-completion stream chunks and deltas

pub mod chat;
pub mod completion;
pub mod models;
pub mod streaming;

// Re-export commonly used types
pub use chat::{
    ChatCompletionRequest, ChatCompletionResponse, CompletionMessage, Message, MessageRole,
    ResponseFormat, ToolCall, ToolChoice, ToolConfig, ToolDefinition, ToolParamDefinition,
    ToolPromptFormat,
};
pub use completion::{
    CompletionChunk, CompletionRequest, CompletionResponse, LogProbConfig, SamplingParams,
    SamplingStrategy, TokenLogProbs,
};
pub use models::{Model, ModelList, ProviderInfo, ProviderList};
pub use streaming::{
    ChatCompletionChunk, ChatCompletionEvent, ChatEventType, ContentDelta, ToolCallDelta,
    ToolCallParseStatus,
};
