//! Model Provider Trait
//!
//! The single model-call boundary of the planner: prompt text in,
//! completion text out.

use async_trait::async_trait;

use super::types::{LlmError, LlmResult};

/// Trait that all model providers must implement.
///
/// Implementations perform one non-streaming completion per call and never
/// retry; failures surface to the caller as `LlmError`.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the current model being used.
    fn model(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> LlmResult<String>;

    /// Check if the provider is healthy and reachable.
    async fn health_check(&self) -> LlmResult<()> {
        Ok(())
    }
}

/// Map an SDK error message onto an `LlmError`.
pub fn classify_error(message: &str, base_url: &str, model: &str) -> LlmError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("connect") || lower.contains("connection refused") {
        LlmError::ProviderUnavailable {
            message: format!("Cannot connect to {}: {}", base_url, message),
        }
    } else if lower.contains("not found") || lower.contains("404") {
        LlmError::ModelNotFound {
            model: model.to_string(),
        }
    } else if lower.contains("timed out") || lower.contains("timeout") {
        LlmError::NetworkError {
            message: format!("Request to {} timed out: {}", base_url, message),
        }
    } else {
        LlmError::NetworkError {
            message: message.to_string(),
        }
    }
}
