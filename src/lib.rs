//! # inference-conformance
//!
//! Conformance test harness for Llama-Stack-style text inference APIs.
//!
//! ## Key Features
//!
//! - **Wire client**: thin typed client for the completion and
//!   chat-completion endpoints, non-streaming and SSE streaming
//! - **Capability gating**: skip or report known limitations per provider
//!   type (completion mode, logprobs, structured output, stop sequences)
//! - **Fixture registry**: embedded test cases keyed by
//!   `inference:<operation>:<case>`
//! - **Multi-turn driver**: fixture-driven tool-calling loop with canned
//!   tool outputs
//!
//! ## Example
//!
//! ```rust,no_run
//! use inference_conformance::{StackClient, StackConfig, TestCase};
//! use inference_conformance::wire::CompletionRequest;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = StackConfig::from_env()?;
//! let client = StackClient::new(&config)?;
//!
//! let tc = TestCase::get("inference:completion:sanity")?;
//! let response = client
//!     .completion(CompletionRequest::new(
//!         &config.text_model_id,
//!         tc.str_field("content")?,
//!     ))
//!     .await?;
//! assert!(response.content.len() > 10);
//! # Ok(())
//! # }
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

pub mod capabilities;
pub mod client;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod harness;
pub mod wire;

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod retry;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use capabilities::{multi_turn_tool_gate, tool_prompt_format_for, Gate, StackInventory};
pub use client::StackClient;
pub use config::StackConfig;
pub use error::{ConformanceError, ConformanceResult};
pub use fixtures::{CannedToolResponse, ExpectedTurn, TestCase};
pub use harness::{
    collect_stream_text, extract_tool_invocation_content, render_tool_invocation, ChatApi,
    MultiTurnDriver, TurnRecord,
};
pub use retry::RetryPolicy;
