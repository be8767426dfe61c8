//! LLM — hosted text-generation integration for the dashboard assistant.
//!
//! DESIGN
//! ======
//! One provider, one call shape: the conversation store hands the client a
//! prompt string and gets back trimmed completion text. Configuration comes
//! from environment variables; the [`TextGen`] trait keeps the store testable
//! without network access.

pub mod client;
pub mod config;
pub mod types;

pub use client::InferenceClient;
pub use config::InferenceConfig;
pub use types::{InferenceError, TextGen};
