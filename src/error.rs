//! Error types for Interview Coach.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Profile validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("Name must not be empty")]
    EmptyName,

    #[error("{field} is too long: {length} characters, at most {max} allowed")]
    TooLong {
        field: &'static str,
        length: usize,
        max: usize,
    },

    #[error("Unknown {field}: {value}")]
    UnknownOption { field: &'static str, value: String },
}

/// Interview session errors: generation, persistence and lookup failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("Failed to persist session {file_name}: {reason}")]
    Persistence { file_name: String, reason: String },

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session {file_name} is corrupted: {reason}")]
    Corruption { file_name: String, reason: String },

    #[error("Invalid session file name: {0}")]
    InvalidFileName(String),

    #[error("Cannot {action} while interview is {phase}")]
    InvalidTransition { phase: String, action: String },

    #[error("Invalid answer: {0}")]
    InvalidAnswer(String),

    #[error("Invalid profile: {0}")]
    Profile(#[from] ProfileError),
}

impl SessionError {
    pub(crate) fn persistence(file_name: &str, reason: impl std::fmt::Display) -> Self {
        Self::Persistence {
            file_name: file_name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn corruption(file_name: &str, reason: impl std::fmt::Display) -> Self {
        Self::Corruption {
            file_name: file_name.to_string(),
            reason: reason.to_string(),
        }
    }
}
