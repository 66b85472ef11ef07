//! Ollama Provider
//!
//! Implementation of the LlmProvider trait for Ollama local inference
//! using the ollama-rs native SDK (`/api/generate`, non-streaming).

use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::models::ModelOptions;
use ollama_rs::Ollama;
use url::Url;

use super::http_client::build_http_client;
use super::provider::{classify_error, LlmProvider};
use super::types::{LlmError, LlmResult, ProviderConfig};

/// Default Ollama API endpoint
pub const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

const OLLAMA_DEFAULT_PORT: u16 = 11434;

/// Ollama provider for local inference using the native ollama-rs SDK
pub struct OllamaProvider {
    config: ProviderConfig,
    client: Ollama,
}

impl OllamaProvider {
    /// Create a new Ollama provider with the given configuration
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let base_url = config.base_url.as_deref().unwrap_or(OLLAMA_DEFAULT_URL);
        let url = ollama_url(base_url)?;
        let http_client = build_http_client(config.request_timeout_secs)?;
        let client = Ollama::builder()
            .url(url)
            .reqwest_client(http_client)
            .build();
        Ok(Self { config, client })
    }

    /// Get the base URL for the Ollama server (used in error messages)
    pub fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(OLLAMA_DEFAULT_URL)
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Parse the base URL, filling in Ollama's port when none is given.
///
/// The builder's `host`/`port` setters panic on bad input, so the URL is
/// validated here and handed over whole.
fn ollama_url(base_url: &str) -> LlmResult<Url> {
    let mut parsed = Url::parse(base_url).map_err(|e| LlmError::InvalidRequest {
        message: format!("Invalid Ollama base URL '{}': {}", base_url, e),
    })?;
    if parsed.host_str().is_none() {
        return Err(LlmError::InvalidRequest {
            message: format!("Ollama base URL '{}' has no host", base_url),
        });
    }
    if parsed.port().is_none() {
        parsed
            .set_port(Some(OLLAMA_DEFAULT_PORT))
            .map_err(|_| LlmError::InvalidRequest {
                message: format!("Ollama base URL '{}' cannot carry a port", base_url),
            })?;
    }
    Ok(parsed)
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str) -> LlmResult<String> {
        let options = ModelOptions::default().temperature(self.config.temperature);
        let request =
            GenerationRequest::new(self.config.model.clone(), prompt.to_string()).options(options);

        tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "Calling Ollama");
        let response = self
            .client
            .generate(request)
            .await
            .map_err(|e| classify_error(&e.to_string(), self.base_url(), &self.config.model))?;

        if response.response.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: self.name().to_string(),
            });
        }
        Ok(response.response)
    }

    async fn health_check(&self) -> LlmResult<()> {
        // Use the SDK's list_local_models as a health check
        self.client
            .list_local_models()
            .await
            .map_err(|e| classify_error(&e.to_string(), self.base_url(), &self.config.model))?;
        Ok(())
    }
}
