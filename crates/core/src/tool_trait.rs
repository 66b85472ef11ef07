//! Tool Capability Trait
//!
//! Defines the contract every analysis tool implements. The dispatcher treats
//! all tools uniformly: it hands over the shared `AnalysisContext` and the
//! coerced argument map, and gets back an optional preview and an optional
//! artifact path, or an error.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::AnalysisContext;
use crate::error::CoreResult;
use crate::plan::ArgMap;

/// What a tool hands back on success. Either half may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Structured preview of the result (records, test statistics, ...)
    pub preview: Option<Value>,
    /// File produced by the tool (plot, JSON dump, ...)
    pub artifact: Option<PathBuf>,
}

impl ToolOutput {
    pub fn preview(preview: Value) -> Self {
        Self {
            preview: Some(preview),
            artifact: None,
        }
    }

    pub fn with_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact = Some(path.into());
        self
    }
}

/// Analysis tool capability.
///
/// Implementations may read the context but never mutate it; they receive
/// arguments that already passed coercion and key validation, so required
/// keys are present. Value-level checks (column existence, bounds) are the
/// tool's own job and are reported through `Err`.
#[async_trait]
pub trait AnalysisTool: Send + Sync {
    /// Unique name of this tool (e.g., "summary_stats").
    fn name(&self) -> &str;

    /// Human-readable description of what this tool does.
    fn description(&self) -> &str {
        ""
    }

    /// Execute the tool against the dataset.
    async fn execute(&self, ctx: &AnalysisContext, args: &ArgMap) -> CoreResult<ToolOutput>;
}

/// Read a string argument.
pub fn str_arg<'a>(args: &'a ArgMap, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str)
}

/// Read a list-of-string argument.
pub fn str_list_arg(args: &ArgMap, name: &str) -> Option<Vec<String>> {
    args.get(name).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    })
}

/// Read a boolean argument.
pub fn bool_arg(args: &ArgMap, name: &str) -> Option<bool> {
    args.get(name).and_then(Value::as_bool)
}

/// Read a non-negative integer argument.
pub fn usize_arg(args: &ArgMap, name: &str) -> Option<usize> {
    args.get(name)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
}
