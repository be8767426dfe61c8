//! Inference configuration parsed from environment variables.

use super::types::InferenceError;

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models/mistralai/Mistral-Nemo-Instruct-2407";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferenceTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceConfig {
    pub api_key: String,
    pub endpoint: String,
    pub timeouts: InferenceTimeouts,
}

impl InferenceConfig {
    /// Build typed inference config from environment variables.
    ///
    /// Required:
    /// - `LLM_API_KEY_ENV` (names the env var containing the key)
    ///
    /// Optional:
    /// - `LLM_ENDPOINT`: hosted model URL, default [`DEFAULT_ENDPOINT`]
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::MissingApiKey`] naming whichever variable in
    /// the indirection chain is absent.
    pub fn from_env() -> Result<Self, InferenceError> {
        let key_var = std::env::var("LLM_API_KEY_ENV")
            .map_err(|_| InferenceError::MissingApiKey { var: "LLM_API_KEY_ENV".into() })?;
        let api_key = std::env::var(&key_var).map_err(|_| InferenceError::MissingApiKey { var: key_var.clone() })?;

        let endpoint = std::env::var("LLM_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = InferenceTimeouts {
            request_secs: env_parse_u64("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_key, endpoint, timeouts })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
