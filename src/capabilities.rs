//! Capability gating for provider fleets
//!
//! Not every backend provider supports every operation the suite exercises.
//! This module resolves the configured model to its serving provider and
//! decides, per operation, whether a check runs, is skipped, or is a known
//! limitation the provider has documented upstream.
//!
//! The allowlists are test-maintenance data, mirrored from the upstream
//! provider matrix. Keep them in sync when providers gain capabilities.

use crate::client::StackClient;
use crate::config::StackConfig;
use crate::error::{ConformanceError, ConformanceResult};
use crate::logging::log_debug;
use crate::wire::{Model, ProviderInfo, ToolPromptFormat};
use std::collections::HashMap;

/// Provider types with no completion (single-turn) endpoint support.
const NO_COMPLETION_PROVIDERS: &[&str] = &[
    "remote::openai",
    "remote::anthropic",
    "remote::gemini",
    "remote::groq",
    "remote::sambanova",
];

/// Provider types that honor `logprobs.top_k`.
const LOGPROBS_PROVIDERS: &[&str] = &["remote::together", "remote::fireworks", "remote::vllm"];

/// Provider types with no JSON-schema structured output support.
const NO_JSON_SCHEMA_PROVIDERS: &[&str] = &["remote::sambanova"];

/// The only provider type verified to honor stop sequences.
const STOP_SEQUENCE_PROVIDER: &str = "remote::vllm";

/// Outcome of a capability check for one test.
///
/// `Skip` is a hard gate (the operation does not exist on this provider);
/// `KnownLimitation` is the expected-failure case: the operation exists but
/// has a documented defect or gap, so the check is reported and not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Run,
    Skip(String),
    KnownLimitation(String),
}

impl Gate {
    pub fn is_run(&self) -> bool {
        matches!(self, Gate::Run)
    }

    /// The skip/limitation reason, if the check is gated.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Gate::Run => None,
            Gate::Skip(reason) | Gate::KnownLimitation(reason) => Some(reason),
        }
    }
}

/// Snapshot of the stack's model and provider listings, joined for lookup.
///
/// Models index under both their stack identifier and their provider-side
/// resource id, so either form of a model id resolves.
#[derive(Debug, Clone)]
pub struct StackInventory {
    models: HashMap<String, Model>,
    providers: HashMap<String, ProviderInfo>,
    provider_type_override: Option<String>,
}

impl StackInventory {
    /// Fetch listings from the stack and build the joined index.
    pub async fn load(client: &StackClient, config: &StackConfig) -> ConformanceResult<Self> {
        let models = client.list_models().await?;
        let providers = client.list_providers().await?;
        Ok(Self::from_listings(
            models,
            providers,
            config.provider_type_override.clone(),
        ))
    }

    /// Build the index from already-fetched listings.
    pub fn from_listings(
        models: Vec<Model>,
        providers: Vec<ProviderInfo>,
        provider_type_override: Option<String>,
    ) -> Self {
        let mut model_index = HashMap::new();
        for model in models {
            if let Some(resource_id) = &model.provider_resource_id {
                model_index.insert(resource_id.clone(), model.clone());
            }
            model_index.insert(model.identifier.clone(), model);
        }

        let provider_index = providers
            .into_iter()
            .map(|p| (p.provider_id.clone(), p))
            .collect();

        Self {
            models: model_index,
            providers: provider_index,
            provider_type_override,
        }
    }

    /// Resolve a model id to its registered model entry.
    pub fn model(&self, model_id: &str) -> ConformanceResult<&Model> {
        self.models
            .get(model_id)
            .ok_or_else(|| ConformanceError::model_not_found(model_id))
    }

    /// Resolve a model id to the provider type serving it.
    pub fn provider_type(&self, model_id: &str) -> ConformanceResult<String> {
        if let Some(provider_type) = &self.provider_type_override {
            return Ok(provider_type.clone());
        }
        let model = self.model(model_id)?;
        let provider = self.providers.get(&model.provider_id).ok_or_else(|| {
            ConformanceError::response_parsing_error(format!(
                "Model {} names unknown provider {}",
                model_id, model.provider_id
            ))
        })?;
        Ok(provider.provider_type.clone())
    }

    /// Resolve the underlying llama model name for a model id.
    ///
    /// Prefers an identifier that already names a llama model; falls back to
    /// the `llama_model` metadata entry recorded for aliased registrations.
    pub fn llama_model_id(&self, model_id: &str) -> ConformanceResult<Option<String>> {
        let model = self.model(model_id)?;

        let candidates = [Some(model.identifier.as_str()), model.provider_resource_id.as_deref()];
        for candidate in candidates.into_iter().flatten() {
            if candidate.to_lowercase().contains("llama") {
                return Ok(Some(candidate.to_string()));
            }
        }

        Ok(model.llama_model_metadata().map(str::to_string))
    }

    // =========================================================================
    // Per-operation gates
    // =========================================================================

    /// Gate for the completion (single-turn) endpoint.
    pub fn completion_gate(&self, model_id: &str) -> ConformanceResult<Gate> {
        let provider_type = self.provider_type(model_id)?;
        let unsupported = NO_COMPLETION_PROVIDERS.contains(&provider_type.as_str())
            || provider_type.contains("openai-compat");
        let gate = if unsupported {
            Gate::Skip(format!(
                "Model {model_id} hosted by {provider_type} doesn't support completion"
            ))
        } else {
            Gate::Run
        };
        log_debug!(model_id = %model_id, provider_type = %provider_type, gate = ?gate, "Completion gate");
        Ok(gate)
    }

    /// Gate for JSON-schema structured output.
    pub fn json_schema_gate(&self, model_id: &str) -> ConformanceResult<Gate> {
        let provider_type = self.provider_type(model_id)?;
        if NO_JSON_SCHEMA_PROVIDERS.contains(&provider_type.as_str()) {
            return Ok(Gate::Skip(format!(
                "Model {model_id} hosted by {provider_type} doesn't support json_schema structured output"
            )));
        }
        Ok(Gate::Run)
    }

    /// Gate for the `stop` sampling parameter. Verified only on vLLM.
    pub fn stop_sequence_gate(&self, model_id: &str) -> ConformanceResult<Gate> {
        let provider_type = self.provider_type(model_id)?;
        if provider_type != STOP_SEQUENCE_PROVIDER {
            return Ok(Gate::KnownLimitation(format!(
                "{provider_type} doesn't support 'stop' parameter yet"
            )));
        }
        Ok(Gate::Run)
    }

    /// Gate for log-probability annotations.
    pub fn logprobs_gate(&self, model_id: &str) -> ConformanceResult<Gate> {
        let provider_type = self.provider_type(model_id)?;
        if !LOGPROBS_PROVIDERS.contains(&provider_type.as_str()) {
            return Ok(Gate::KnownLimitation(format!(
                "{provider_type} doesn't support log probs yet"
            )));
        }
        Ok(Gate::Run)
    }
}

/// Gate for the multi-turn tool-calling loop: only exercised against the
/// llama-4 model family so far.
pub fn multi_turn_tool_gate(model_id: &str) -> Gate {
    let id = model_id.to_lowercase();
    if id.contains("llama-4") || id.contains("llama4") {
        Gate::Run
    } else {
        Gate::KnownLimitation("Not tested for non-llama4 models yet".to_string())
    }
}

/// Tool prompt format for a model family.
///
/// 3.1-family models were trained on JSON tool prompts; later families use
/// the python-list rendering.
pub fn tool_prompt_format_for(model_id: &str) -> ToolPromptFormat {
    if model_id.contains("3.1") {
        ToolPromptFormat::Json
    } else {
        ToolPromptFormat::PythonList
    }
}
