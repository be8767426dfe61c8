//! Inference types — text-generation trait, errors, and user-facing mapping.

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by inference client operations.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the inference provider failed.
    #[error("API request failed: {0}")]
    Request(String),

    /// The inference provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    Api { status: u16, body: String },

    /// The inference provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl InferenceError {
    /// Map the failure onto the sentence shown in the chat panel.
    ///
    /// Unauthorized and rate-limit rejections get specific guidance; every
    /// other failure collapses into one retry-later apology so transport
    /// details never leak into the conversation.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Api { status: 401, .. } => "Unauthorized: Please check your API key.",
            Self::Api { status: 429, .. } => "Rate limit exceeded: Please try again later.",
            _ => "I'm sorry, I couldn't process your request at the moment. Please try again later.",
        }
    }
}

// =============================================================================
// TEXT GENERATION TRAIT
// =============================================================================

/// Provider-neutral async trait for text generation. Enables mocking in tests.
#[async_trait::async_trait]
pub trait TextGen: Send + Sync {
    /// Generate a completion for `prompt`, returning the trimmed text.
    ///
    /// # Errors
    ///
    /// Returns an [`InferenceError`] if the request fails, the response is
    /// malformed, or the provider rejects the call.
    async fn generate(&self, prompt: &str) -> Result<String, InferenceError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
