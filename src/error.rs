//! Error types for conformance runs.
//!
//! Structured error handling for the conformance harness: everything that can
//! go wrong between the suite and the stack under test lands in
//! [`ConformanceError`], with categorization and retry guidance.
//!
//! # Result Type
//!
//! Use [`ConformanceResult<T>`] as a convenient alias for
//! `Result<T, ConformanceError>`:
//!
//! ```rust
//! use inference_conformance::ConformanceResult;
//!
//! fn my_check() -> ConformanceResult<String> {
//!     Ok("ok".to_string())
//! }
//! ```

use crate::logging::{log_error, log_warn};
use thiserror::Error;

/// High-level categorization of errors for handling decisions.
///
/// Use [`ConformanceError::category()`] to get the category for any error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The harness configuration or the request we built is at fault.
    ///
    /// Fix the environment or the fixture; retrying will not help.
    Client,

    /// The stack under test misbehaved (bad status, malformed body,
    /// broken stream framing).
    External,

    /// Temporary failures that should be retried with backoff
    /// (rate limits, timeouts, connection resets).
    Transient,
}

/// Convenient result type for conformance operations.
///
/// Alias for `Result<T, ConformanceError>`.
pub type ConformanceResult<T> = std::result::Result<T, ConformanceError>;

/// Errors that can occur while driving the stack under test.
///
/// Each variant can be categorized via [`category()`](Self::category) and
/// checked for retryability via [`is_retryable()`](Self::is_retryable).
///
/// # Creating Errors
///
/// Use the constructor methods, which log the error as a side effect:
///
/// ```rust
/// use inference_conformance::ConformanceError;
///
/// let err = ConformanceError::configuration_error("STACK_BASE_URL is not set");
/// let err = ConformanceError::timeout(120);
/// ```
#[derive(Error, Debug)]
pub enum ConformanceError {
    /// Harness configuration is invalid or incomplete.
    ///
    /// Common causes: missing `STACK_BASE_URL` / `TEXT_MODEL_ID`, malformed
    /// base URL, zero retry attempts.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// The HTTP request to the stack failed.
    ///
    /// Carries the status code when the server answered at all. Generally
    /// retryable; check the source error for the underlying cause.
    #[error("Request failed{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    RequestFailed {
        /// Description of the failure.
        message: String,
        /// HTTP status code, if a response was received.
        status: Option<u16>,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication with the stack failed (401/403).
    ///
    /// Check `STACK_API_KEY`. Not retryable.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Details about the authentication failure.
        message: String,
    },

    /// Stack rate limit exceeded (429).
    #[error("Rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimitExceeded {
        /// Recommended wait time before retrying.
        retry_after_seconds: u64,
    },

    /// Request timed out.
    #[error("Request timed out after {timeout_seconds}s")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout_seconds: u64,
    },

    /// Failed to parse a response body.
    ///
    /// The stack answered, but the body doesn't match the wire contract.
    #[error("Response parsing failed: {message}")]
    ResponseParsingError {
        /// Details about the parsing failure.
        message: String,
    },

    /// A streamed response violated SSE framing or chunk structure.
    #[error("Stream protocol error: {message}")]
    StreamProtocolError {
        /// Details about the framing violation.
        message: String,
    },

    /// No fixture registered under the requested identifier.
    #[error("Unknown test case: {id}")]
    FixtureMissing {
        /// The namespaced fixture id that failed to resolve.
        id: String,
    },

    /// The configured model id is not served by the stack under test.
    #[error("Model not found on stack: {model_id}")]
    ModelNotFound {
        /// The model id that failed to resolve.
        model_id: String,
    },
}

impl ConformanceError {
    /// Get the error category for handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError { .. } => ErrorCategory::Client,
            Self::RequestFailed { .. } => ErrorCategory::External,
            Self::AuthenticationFailed { .. } => ErrorCategory::Client,
            Self::RateLimitExceeded { .. } => ErrorCategory::Transient,
            Self::Timeout { .. } => ErrorCategory::Transient,
            Self::ResponseParsingError { .. } => ErrorCategory::External,
            Self::StreamProtocolError { .. } => ErrorCategory::External,
            Self::FixtureMissing { .. } => ErrorCategory::Client,
            Self::ModelNotFound { .. } => ErrorCategory::Client,
        }
    }

    /// Whether this error is transient and should trigger a retry.
    ///
    /// Returns `true` for rate limits, timeouts, and request failures with
    /// no status or a 5xx status. Parsing and framing errors are never
    /// retried: re-sending the same request would re-produce them.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimitExceeded { .. } | Self::Timeout { .. } => true,
            Self::RequestFailed { status, .. } => match status {
                None => true,
                Some(s) => *s >= 500,
            },
            _ => false,
        }
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================

    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Harness configuration validation failed"
        );
        Self::ConfigurationError { message }
    }

    pub fn request_failed(
        message: impl Into<String>,
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        log_error!(
            error_type = "request_failed",
            message = %message,
            status = status,
            has_source = source.is_some(),
            "Stack request execution failed"
        );
        Self::RequestFailed {
            message,
            status,
            source,
        }
    }

    pub fn authentication_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "authentication_failed",
            message = %message,
            "Stack authentication failed"
        );
        Self::AuthenticationFailed { message }
    }

    pub fn rate_limit_exceeded(retry_after_seconds: u64) -> Self {
        log_warn!(
            error_type = "rate_limit_exceeded",
            retry_after_seconds = retry_after_seconds,
            "Stack rate limit exceeded"
        );
        Self::RateLimitExceeded {
            retry_after_seconds,
        }
    }

    pub fn timeout(timeout_seconds: u64) -> Self {
        log_warn!(
            error_type = "timeout",
            timeout_seconds = timeout_seconds,
            "Stack request timed out"
        );
        Self::Timeout { timeout_seconds }
    }

    pub fn response_parsing_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "response_parsing_error",
            message = %message,
            "Stack response format invalid"
        );
        Self::ResponseParsingError { message }
    }

    pub fn stream_protocol_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "stream_protocol_error",
            message = %message,
            "Stack stream framing invalid"
        );
        Self::StreamProtocolError { message }
    }

    pub fn fixture_missing(id: impl Into<String>) -> Self {
        let id = id.into();
        log_error!(
            error_type = "fixture_missing",
            id = %id,
            "No fixture registered under requested id"
        );
        Self::FixtureMissing { id }
    }

    pub fn model_not_found(model_id: impl Into<String>) -> Self {
        let model_id = model_id.into();
        log_error!(
            error_type = "model_not_found",
            model_id = %model_id,
            "Configured model is not served by the stack"
        );
        Self::ModelNotFound { model_id }
    }
}
