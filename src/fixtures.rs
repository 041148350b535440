//! Fixture registry for conformance test cases
//!
//! Test cases are literal input/expected-output pairs embedded at build time
//! and looked up by a namespaced id: `inference:<operation>:<case>`, e.g.
//! `inference:chat_completion:tool_calling`. Suites never hard-code prompts;
//! they pull everything from here so fixture maintenance stays in one place.

use crate::error::{ConformanceError, ConformanceResult};
use crate::wire::{Message, ToolDefinition};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

const COMPLETION_FIXTURES: &str = include_str!("../fixtures/inference/completion.json");
const CHAT_COMPLETION_FIXTURES: &str = include_str!("../fixtures/inference/chat_completion.json");

static REGISTRY: Lazy<HashMap<String, serde_json::Value>> = Lazy::new(|| {
    let mut registry = HashMap::new();
    register(&mut registry, "inference:completion", COMPLETION_FIXTURES);
    register(
        &mut registry,
        "inference:chat_completion",
        CHAT_COMPLETION_FIXTURES,
    );
    registry
});

fn register(registry: &mut HashMap<String, serde_json::Value>, namespace: &str, raw: &str) {
    // Embedded documents are validated by unit tests; a malformed one is a
    // build artifact defect, not a runtime condition.
    let doc: HashMap<String, serde_json::Value> =
        serde_json::from_str(raw).unwrap_or_else(|e| panic!("Malformed fixture document {namespace}: {e}"));
    for (case, value) in doc {
        registry.insert(format!("{namespace}:{case}"), value);
    }
}

/// Expected shape of one turn in a multi-turn tool-calling fixture.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExpectedTurn {
    /// Tool calls the assistant must make this turn
    pub num_tool_calls: usize,
    /// Required tool name when `num_tool_calls > 0`
    #[serde(default)]
    pub tool_name: Option<String>,
    /// Required literal argument mapping when `num_tool_calls > 0`
    #[serde(default)]
    pub tool_arguments: Option<serde_json::Value>,
    /// Substring the final answer must contain when `num_tool_calls == 0`
    #[serde(default)]
    pub answer: Option<String>,
}

/// Canned tool output to feed back after a tool-call turn.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CannedToolResponse {
    pub response: String,
}

/// One registered test case.
#[derive(Debug, Clone)]
pub struct TestCase {
    id: String,
    data: serde_json::Value,
}

impl TestCase {
    /// Look up a test case by its namespaced id.
    ///
    /// # Errors
    ///
    /// Returns [`ConformanceError::FixtureMissing`] for unknown ids.
    pub fn get(id: &str) -> ConformanceResult<Self> {
        let data = REGISTRY
            .get(id)
            .cloned()
            .ok_or_else(|| ConformanceError::fixture_missing(id))?;
        Ok(Self {
            id: id.to_string(),
            data,
        })
    }

    /// All registered fixture ids, for registry completeness checks.
    pub fn registered_ids() -> Vec<String> {
        let mut ids: Vec<String> = REGISTRY.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw fixture payload.
    pub fn raw(&self) -> &serde_json::Value {
        &self.data
    }

    fn field(&self, name: &str) -> ConformanceResult<&serde_json::Value> {
        self.data.get(name).ok_or_else(|| {
            ConformanceError::fixture_missing(format!("{}#{name}", self.id))
        })
    }

    fn typed_field<T: serde::de::DeserializeOwned>(&self, name: &str) -> ConformanceResult<T> {
        let value = self.field(name)?.clone();
        serde_json::from_value(value).map_err(|e| {
            ConformanceError::response_parsing_error(format!(
                "Fixture {} field '{name}' has unexpected shape: {e}",
                self.id
            ))
        })
    }

    /// A required string field (`content`, `question`, `user_input`, ...).
    pub fn str_field(&self, name: &str) -> ConformanceResult<String> {
        self.typed_field(name)
    }

    /// The `expected` field as a string (substring-match cases).
    pub fn expected_str(&self) -> ConformanceResult<String> {
        self.typed_field("expected")
    }

    /// The `expected` field as raw JSON (literal-mapping cases).
    pub fn expected_value(&self) -> ConformanceResult<serde_json::Value> {
        self.typed_field("expected")
    }

    /// Conversation messages for single-conversation chat cases.
    pub fn messages(&self) -> ConformanceResult<Vec<Message>> {
        self.typed_field("messages")
    }

    /// Tool definitions offered to the model.
    pub fn tools(&self) -> ConformanceResult<Vec<ToolDefinition>> {
        self.typed_field("tools")
    }

    /// Ordered message batches for multi-turn cases.
    pub fn message_batches(&self) -> ConformanceResult<Vec<Vec<Message>>> {
        self.typed_field("message_batches")
    }

    /// Per-turn expectations for multi-turn cases.
    pub fn expected_turns(&self) -> ConformanceResult<Vec<ExpectedTurn>> {
        self.typed_field("expected")
    }

    /// Canned tool outputs, consumed in order across tool-call turns.
    pub fn tool_responses(&self) -> ConformanceResult<Vec<CannedToolResponse>> {
        self.typed_field("tool_responses")
    }
}
