//! Plan and Execution Result Types
//!
//! `PlanStep` is one tool invocation proposed by the model; `ExecutionResult`
//! is what running it produced. Exactly one result exists per executed step.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Loosely typed argument bag as supplied by the model.
pub type ArgMap = serde_json::Map<String, Value>;

/// A single step of an analysis plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Unique identifier, generated when the step is created
    pub step_id: String,
    /// Human-readable description of the step
    pub description: String,
    /// Name of the tool to invoke
    pub tool: String,
    /// Arguments to pass to the tool
    #[serde(default)]
    pub args: ArgMap,
}

impl PlanStep {
    /// Create a step with a fresh identifier.
    pub fn new(description: impl Into<String>, tool: impl Into<String>, args: ArgMap) -> Self {
        Self {
            step_id: uuid::Uuid::new_v4().to_string(),
            description: description.into(),
            tool: tool.into(),
            args,
        }
    }
}

/// Execution status of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
}

/// Result of executing a single plan step.
///
/// Only constructible through [`ExecutionResult::success`] and
/// [`ExecutionResult::error`]: an error result never carries a preview or an
/// artifact, a success result never carries an error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawExecutionResult")]
pub struct ExecutionResult {
    step_id: String,
    status: ExecutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_preview: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    artifact_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ExecutionResult {
    /// Create a successful result.
    pub fn success(
        step_id: impl Into<String>,
        output_preview: Option<Value>,
        artifact_path: Option<PathBuf>,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            status: ExecutionStatus::Success,
            output_preview,
            artifact_path,
            error: None,
        }
    }

    /// Create an error result
    pub fn error(step_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: ExecutionStatus::Error,
            output_preview: None,
            artifact_path: None,
            error: Some(error.into()),
        }
    }

    pub fn step_id(&self) -> &str {
        &self.step_id
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    pub fn output_preview(&self) -> Option<&Value> {
        self.output_preview.as_ref()
    }

    pub fn artifact_path(&self) -> Option<&Path> {
        self.artifact_path.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[derive(Deserialize)]
struct RawExecutionResult {
    step_id: String,
    status: ExecutionStatus,
    #[serde(default)]
    output_preview: Option<Value>,
    #[serde(default)]
    artifact_path: Option<PathBuf>,
    #[serde(default)]
    error: Option<String>,
}

impl TryFrom<RawExecutionResult> for ExecutionResult {
    type Error = String;

    fn try_from(raw: RawExecutionResult) -> Result<Self, Self::Error> {
        match raw.status {
            ExecutionStatus::Success if raw.error.is_some() => {
                Err("success result must not carry an error".to_string())
            }
            ExecutionStatus::Success => Ok(Self::success(
                raw.step_id,
                raw.output_preview,
                raw.artifact_path,
            )),
            ExecutionStatus::Error => {
                if raw.output_preview.is_some() || raw.artifact_path.is_some() {
                    return Err("error result must not carry output".to_string());
                }
                let error = raw
                    .error
                    .ok_or_else(|| "error result must carry a message".to_string())?;
                Ok(Self::error(raw.step_id, error))
            }
        }
    }
}
