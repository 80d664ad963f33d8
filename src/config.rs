//! Configuration types.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

pub const DEFAULT_SESSIONS_DIR: &str = "saved_conversations";

/// Application configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    /// Directory holding one JSON file per session.
    pub sessions_dir: PathBuf,
    /// When set, a JSON debug log is written here.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Build configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match get("INTERVIEW_COACH_BACKEND") {
            Some(value) => value.parse::<LlmBackend>().map_err(|message| {
                ConfigError::InvalidValue {
                    key: "INTERVIEW_COACH_BACKEND".to_string(),
                    message,
                }
            })?,
            None => LlmBackend::OpenAi,
        };

        let key_var = backend.api_key_var();
        let api_key = get(key_var).ok_or_else(|| ConfigError::MissingEnvVar(key_var.to_string()))?;

        let model = get("INTERVIEW_COACH_MODEL")
            .unwrap_or_else(|| backend.default_model().to_string());

        let sessions_dir = get("INTERVIEW_COACH_SESSIONS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSIONS_DIR));

        Ok(Self {
            llm: LlmConfig {
                backend,
                api_key: SecretString::from(api_key),
                model,
            },
            sessions_dir,
            log_dir: get("INTERVIEW_COACH_LOG_DIR").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_openai() {
        let cfg = config(&[("OPENAI_API_KEY", "sk-123")]).unwrap();
        assert_eq!(cfg.llm.backend, LlmBackend::OpenAi);
        assert_eq!(cfg.llm.model, "gpt-4o");
        assert_eq!(cfg.llm.api_key.expose_secret(), "sk-123");
        assert_eq!(cfg.sessions_dir, PathBuf::from(DEFAULT_SESSIONS_DIR));
        assert!(cfg.log_dir.is_none());
    }

    #[test]
    fn missing_key_for_selected_backend() {
        let err = config(&[
            ("INTERVIEW_COACH_BACKEND", "anthropic"),
            ("OPENAI_API_KEY", "sk-123"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "ANTHROPIC_API_KEY"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let err = config(&[("OPENAI_API_KEY", "   ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config(&[
            ("INTERVIEW_COACH_BACKEND", "anthropic"),
            ("ANTHROPIC_API_KEY", "ak"),
            ("INTERVIEW_COACH_MODEL", "claude-test"),
            ("INTERVIEW_COACH_SESSIONS_DIR", "/tmp/sessions"),
            ("INTERVIEW_COACH_LOG_DIR", "/tmp/logs"),
        ])
        .unwrap();
        assert_eq!(cfg.llm.backend, LlmBackend::Anthropic);
        assert_eq!(cfg.llm.model, "claude-test");
        assert_eq!(cfg.sessions_dir, PathBuf::from("/tmp/sessions"));
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn invalid_backend_is_rejected() {
        let err = config(&[("INTERVIEW_COACH_BACKEND", "gemini"), ("OPENAI_API_KEY", "sk")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
