//! Provider Types
//!
//! Provider configuration and the error type shared by every model call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    Ollama,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(ProviderType::Ollama),
            other => Err(LlmError::InvalidRequest {
                message: format!("Unknown model provider '{}'", other),
            }),
        }
    }
}

/// Configuration for a model provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The provider type
    #[serde(default)]
    pub provider: ProviderType,
    /// Base URL override (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model name to use
    pub model: String,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.0
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::Ollama,
            base_url: None,
            model: "gemma3:12b".to_string(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Error types for model calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LlmError {
    /// Model not found or not pulled
    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    /// Invalid request (bad parameters or configuration)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Network/connection error
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// Provider not reachable (e.g. Ollama not running)
    #[error("Provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    /// The provider answered with an empty completion
    #[error("Empty response from {provider}")]
    EmptyResponse { provider: String },

    /// Other error
    #[error("Error: {message}")]
    Other { message: String },
}

impl From<LlmError> for String {
    fn from(err: LlmError) -> Self {
        err.to_string()
    }
}

/// Result type for model calls
pub type LlmResult<T> = Result<T, LlmError>;
