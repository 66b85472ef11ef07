//! Plan Parser
//!
//! Turns raw model output into `PlanStep`s in two passes:
//!
//! - Pass 1: the whole text is a JSON array of step objects
//! - Pass 2: only if pass 1 fails to decode, the widest `[ { ... } ]` block
//!   is cut out of the surrounding prose or code fences and decoded
//!
//! Any other failure rejects the whole plan.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use dataplan_core::{ArgMap, PlanStep};

use super::logging::PlanSink;

/// The model output could not be turned into a plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct PlanParseError {
    pub reason: String,
    /// The unmodified model output
    pub raw: String,
}

impl PlanParseError {
    fn new(reason: impl Into<String>, raw: &str) -> Self {
        Self {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }
}

fn array_block() -> &'static Regex {
    static ARRAY_BLOCK: OnceLock<Regex> = OnceLock::new();
    ARRAY_BLOCK.get_or_init(|| Regex::new(r"(?s)\[\s*\{.*\}\s*\]").expect("array block pattern"))
}

/// Cut the widest `[ { ... } ]` block out of `text`.
pub fn extract_json_array(text: &str) -> Option<&str> {
    array_block().find(text).map(|m| m.as_str().trim())
}

/// Parse model output into plan steps, giving every step a fresh id.
pub fn parse_plan(text: &str, sink: &dyn PlanSink) -> Result<Vec<PlanStep>, PlanParseError> {
    let strict_err = match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            return load_plan_steps(&value).map_err(|reason| {
                sink.text("parse_error", &format!("{}\n\nRaw:\n{}", reason, text));
                PlanParseError::new(reason, text)
            });
        }
        Err(e) => e,
    };

    sink.text(
        "parse_warn",
        &format!("Strict parse failed:\n{}\n\nRaw:\n{}", strict_err, text),
    );
    tracing::warn!(error = %strict_err, "Strict plan parse failed, trying array extraction");

    let Some(cleaned) = extract_json_array(text) else {
        sink.text(
            "parse_error",
            &format!("Could not extract JSON array from:\n\n{}", text),
        );
        return Err(PlanParseError::new(
            "Failed to extract JSON array from model output.",
            text,
        ));
    };

    serde_json::from_str::<Value>(cleaned)
        .map_err(|e| e.to_string())
        .and_then(|value| load_plan_steps(&value))
        .map_err(|reason| {
            sink.text(
                "parse_error",
                &format!("Cleaned parse failed:\n{}\n\nCleaned:\n{}", reason, cleaned),
            );
            PlanParseError::new(reason, text)
        })
}

/// Convert a decoded JSON value into steps. All-or-nothing.
fn load_plan_steps(value: &Value) -> Result<Vec<PlanStep>, String> {
    let items = value
        .as_array()
        .ok_or_else(|| format!("Expected a JSON array of steps, got {}", type_name(value)))?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| load_step(idx, item))
        .collect()
}

fn load_step(idx: usize, item: &Value) -> Result<PlanStep, String> {
    let obj = item
        .as_object()
        .ok_or_else(|| format!("Step {} is not an object", idx))?;

    let field = |key: &str| -> Result<String, String> {
        match obj.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(format!(
                "Step {} field '{}' must be a string, got {}",
                idx,
                key,
                type_name(other)
            )),
            None => Err(format!("Step {} is missing '{}'", idx, key)),
        }
    };
    let description = field("description")?;
    let tool = field("tool")?;

    let args = match obj.get("args") {
        None | Some(Value::Null) => ArgMap::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(format!(
                "Step {} 'args' must be an object, got {}",
                idx,
                type_name(other)
            ))
        }
    };

    Ok(PlanStep::new(description, tool, args))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
