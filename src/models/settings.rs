//! Settings Models
//!
//! Application configuration and settings data structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use dataplan_llm::{ProviderConfig, ProviderType};

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model provider, currently only "ollama"
    #[serde(default = "default_model_provider")]
    pub model_provider: String,
    /// Model used for planning
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Provider endpoint
    #[serde(default = "default_model_base_url")]
    pub model_base_url: String,
    /// Sampling temperature (0.0 - 2.0)
    #[serde(default)]
    pub temperature: f32,
    /// Timeout of a single model request in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Optional wall-clock limit for a whole analysis run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_timeout_secs: Option<u64>,
    /// Where per-run plan logs are written
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
    /// Where tools write artifacts
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
    /// Write prompt/raw/clean/dedup logs for each planning call
    #[serde(default = "default_true")]
    pub plan_logging_enabled: bool,
    /// Tools shown as worked examples in the planning prompt
    #[serde(default = "default_example_tools")]
    pub example_tools: Vec<String>,
}

fn default_model_provider() -> String {
    "ollama".to_string()
}

fn default_model_name() -> String {
    "gemma3:12b".to_string()
}

fn default_model_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_true() -> bool {
    true
}

fn default_example_tools() -> Vec<String> {
    vec!["summary_stats".to_string(), "boxplot".to_string()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_provider: default_model_provider(),
            model_name: default_model_name(),
            model_base_url: default_model_base_url(),
            temperature: 0.0,
            request_timeout_secs: default_request_timeout_secs(),
            run_timeout_secs: None,
            logs_dir: default_logs_dir(),
            artifacts_dir: default_artifacts_dir(),
            plan_logging_enabled: true,
            example_tools: default_example_tools(),
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub model_provider: Option<String>,
    pub model_name: Option<String>,
    pub model_base_url: Option<String>,
    pub temperature: Option<f32>,
    pub request_timeout_secs: Option<u64>,
    pub run_timeout_secs: Option<u64>,
    pub logs_dir: Option<PathBuf>,
    pub artifacts_dir: Option<PathBuf>,
    pub plan_logging_enabled: Option<bool>,
    pub example_tools: Option<Vec<String>>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(provider) = update.model_provider {
            self.model_provider = provider;
        }
        if let Some(model) = update.model_name {
            self.model_name = model;
        }
        if let Some(url) = update.model_base_url {
            self.model_base_url = url;
        }
        if let Some(temperature) = update.temperature {
            self.temperature = temperature;
        }
        if let Some(secs) = update.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
        if let Some(secs) = update.run_timeout_secs {
            self.run_timeout_secs = Some(secs);
        }
        if let Some(dir) = update.logs_dir {
            self.logs_dir = dir;
        }
        if let Some(dir) = update.artifacts_dir {
            self.artifacts_dir = dir;
        }
        if let Some(enabled) = update.plan_logging_enabled {
            self.plan_logging_enabled = enabled;
        }
        if let Some(tools) = update.example_tools {
            self.example_tools = tools;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        self.model_provider
            .parse::<ProviderType>()
            .map_err(|e| e.to_string())?;

        if self.model_name.trim().is_empty() {
            return Err("model_name must not be empty".to_string());
        }

        if url::Url::parse(&self.model_base_url).is_err() {
            return Err(format!("Invalid model_base_url: {}", self.model_base_url));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be at least 1 second".to_string());
        }

        if self.run_timeout_secs == Some(0) {
            return Err("run_timeout_secs must be at least 1 second".to_string());
        }

        Ok(())
    }

    /// Provider configuration derived from these settings.
    pub fn provider_config(&self) -> Result<ProviderConfig, String> {
        let provider = self
            .model_provider
            .parse::<ProviderType>()
            .map_err(|e| e.to_string())?;
        Ok(ProviderConfig {
            provider,
            base_url: Some(self.model_base_url.clone()),
            model: self.model_name.clone(),
            temperature: self.temperature,
            request_timeout_secs: self.request_timeout_secs,
        })
    }
}
