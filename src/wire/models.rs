//! Model and provider listing types
//!
//! Capability gating joins these two listings: a model resolves to its
//! serving provider, and the provider type decides which suites run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A model registered on the stack under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Stack-side identifier, e.g. `meta-llama/Llama-3.1-8B-Instruct`
    pub identifier: String,
    /// Identifier the serving provider knows the model by
    #[serde(default)]
    pub provider_resource_id: Option<String>,
    /// Provider serving this model
    pub provider_id: String,
    /// Free-form metadata; may carry a `llama_model` entry for aliased models
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Model {
    /// The underlying llama model name recorded in metadata, if any.
    pub fn llama_model_metadata(&self) -> Option<&str> {
        self.metadata.get("llama_model").and_then(|v| v.as_str())
    }
}

/// Envelope for `GET /v1/models`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelList {
    pub data: Vec<Model>,
}

/// A provider configured on the stack under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Deployment-local provider id, joined against [`Model::provider_id`]
    pub provider_id: String,
    /// Provider implementation type, e.g. `remote::vllm`
    pub provider_type: String,
}

/// Envelope for `GET /v1/providers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderList {
    pub data: Vec<ProviderInfo>,
}
