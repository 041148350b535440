//! Harness configuration for the stack under test
//!
//! Environment access is confined to this module: everything else receives a
//! validated [`StackConfig`].

use crate::error::{ConformanceError, ConformanceResult};
use crate::logging::log_debug;
use crate::retry::RetryPolicy;
use std::time::Duration;

/// Configuration for a conformance run against one stack deployment.
#[derive(Debug, Clone)]
pub struct StackConfig {
    /// Base URL of the stack under test, e.g. `http://localhost:8321`
    pub base_url: String,
    /// Bearer token, if the deployment requires one
    pub api_key: Option<String>,
    /// Model id the text suites run against
    pub text_model_id: String,
    /// Force a provider type instead of resolving it from `/v1/providers`.
    /// Useful for deployments whose provider listing is not exposed.
    pub provider_type_override: Option<String>,
    /// Retry policy applied to non-streaming calls
    pub retry_policy: RetryPolicy,
    /// Pause between multi-turn tool-calling turns (rate limits)
    pub turn_pause: Duration,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8321".to_string(),
            api_key: None,
            text_model_id: "meta-llama/Llama-3.1-8B-Instruct".to_string(),
            provider_type_override: None,
            retry_policy: RetryPolicy::default(),
            turn_pause: Duration::from_secs(1),
        }
    }
}

impl StackConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `STACK_BASE_URL`, `STACK_API_KEY`,
    /// `TEXT_MODEL_ID`, `STACK_PROVIDER_TYPE`, `STACK_TURN_PAUSE_MS`.
    ///
    /// # Errors
    ///
    /// Returns [`ConformanceError::ConfigurationError`] if required variables
    /// are missing or validation fails.
    pub fn from_env() -> ConformanceResult<Self> {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("STACK_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(api_key) = std::env::var("STACK_API_KEY") {
            if !api_key.trim().is_empty() {
                config.api_key = Some(api_key);
            }
        }
        if let Ok(model_id) = std::env::var("TEXT_MODEL_ID") {
            config.text_model_id = model_id;
        }
        if let Ok(provider_type) = std::env::var("STACK_PROVIDER_TYPE") {
            if !provider_type.trim().is_empty() {
                config.provider_type_override = Some(provider_type);
            }
        }
        if let Ok(pause_ms) = std::env::var("STACK_TURN_PAUSE_MS") {
            let pause_ms = pause_ms.parse::<u64>().map_err(|_| {
                ConformanceError::configuration_error(format!(
                    "STACK_TURN_PAUSE_MS must be an integer, got '{pause_ms}'"
                ))
            })?;
            config.turn_pause = Duration::from_millis(pause_ms);
        }

        config.validate()?;

        log_debug!(
            base_url = %config.base_url,
            text_model_id = %config.text_model_id,
            has_api_key = config.api_key.is_some(),
            provider_type_override = ?config.provider_type_override,
            "Stack configuration loaded and validated"
        );

        Ok(config)
    }

    /// Validate the configuration is complete.
    ///
    /// # Errors
    ///
    /// Returns [`ConformanceError::ConfigurationError`] if:
    /// - the base URL is empty or not http(s)
    /// - the text model id is empty
    /// - the retry policy allows zero attempts
    pub fn validate(&self) -> ConformanceResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConformanceError::configuration_error(
                "Stack base URL is required",
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConformanceError::configuration_error(format!(
                "Stack base URL must be http(s), got '{}'",
                self.base_url
            )));
        }
        if self.text_model_id.trim().is_empty() {
            return Err(ConformanceError::configuration_error(
                "Text model id is required",
            ));
        }
        if self.retry_policy.max_attempts == 0 {
            return Err(ConformanceError::configuration_error(
                "Retry policy must allow at least one attempt",
            ));
        }
        Ok(())
    }

    /// Base URL with any trailing slash stripped.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
