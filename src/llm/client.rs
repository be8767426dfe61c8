//! Hosted inference API client.
//!
//! Thin HTTP wrapper for a hosted text-generation model that accepts
//! `{"inputs": "<prompt>"}` and answers with a JSON array of generations.
//! Pure parsing in `parse_generation` for testability.

use super::config::InferenceConfig;
use super::types::{InferenceError, TextGen};
use std::time::Duration;

// =============================================================================
// CLIENT
// =============================================================================

pub struct InferenceClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl InferenceClient {
    /// Build a client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::ClientBuild`] if the HTTP client fails to build.
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| InferenceError::ClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: config.endpoint, api_key: config.api_key })
    }

    /// Build a client from environment variables. See
    /// [`InferenceConfig::from_env`] for the variable list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, InferenceError> {
        Self::new(InferenceConfig::from_env()?)
    }
}

#[async_trait::async_trait]
impl TextGen for InferenceClient {
    async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let body = ApiRequest { inputs: prompt };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(InferenceError::Api { status, body: text });
        }

        parse_generation(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    inputs: &'a str,
}

#[derive(serde::Deserialize)]
struct Generation {
    generated_text: String,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_generation(json: &str) -> Result<String, InferenceError> {
    let generations: Vec<Generation> = serde_json::from_str(json).map_err(|e| InferenceError::Parse(e.to_string()))?;

    let first = generations
        .into_iter()
        .next()
        .ok_or_else(|| InferenceError::Parse("empty generation array".into()))?;

    Ok(first.generated_text.trim().to_string())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
