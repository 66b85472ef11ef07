//! Argument Coercion & Validation
//!
//! Two independent passes over a step's raw arguments:
//!
//! - `coerce_args` repairs shape drift (a bare string where a list is
//!   declared, a one-element list where a string is declared, ...). It never
//!   fails and leaves undeclared keys untouched.
//! - `validate_args` then checks keys only: the tool must be registered, every
//!   required argument present, nothing undeclared supplied.

use serde_json::{Number, Value};
use thiserror::Error;

use dataplan_core::ArgMap;

use crate::spec::{ArgType, ToolSpecRegistry};

/// Key-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unknown tool '{0}'.")]
    UnknownTool(String),

    #[error("{}", invalid_args_message(.tool, .missing, .unexpected))]
    InvalidArgs {
        tool: String,
        /// Required arguments that were not supplied, in declaration order
        missing: Vec<String>,
        /// Supplied arguments the tool does not declare, sorted
        unexpected: Vec<String>,
    },
}

fn quoted_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    format!("[{}]", quoted.join(", "))
}

fn invalid_args_message(tool: &str, missing: &[String], unexpected: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!(
            "Missing required arg(s) {} for tool '{}'.",
            quoted_list(missing),
            tool
        ));
    }
    if !unexpected.is_empty() {
        parts.push(format!(
            "Unexpected arg(s) {} for tool '{}'.",
            quoted_list(unexpected),
            tool
        ));
    }
    parts.join(" ")
}

/// Coerce `args` towards the shapes declared for `tool`.
///
/// - `List[str]` ← string (wrap), array (stringify items), `null` (empty)
/// - `str` ← one-element array (unwrap), anything else (stringify)
/// - `int` / `float` / `bool` ← parseable strings, one-element scalar arrays
///
/// Unknown tools and undeclared keys pass through unchanged. Applying the
/// function to its own output returns the same map.
pub fn coerce_args(specs: &ToolSpecRegistry, tool: &str, args: &ArgMap) -> ArgMap {
    let spec = specs.get(tool);

    args.iter()
        .map(|(key, value)| {
            let declared = spec.and_then(|s| s.arg(key)).map(|a| a.arg_type);
            let coerced = match declared {
                Some(arg_type) => coerce_value(arg_type, value),
                None => value.clone(),
            };
            (key.clone(), coerced)
        })
        .collect()
}

/// Coerce a single value to a declared shape.
pub fn coerce_value(arg_type: ArgType, value: &Value) -> Value {
    match arg_type {
        ArgType::StringList => Value::Array(to_string_list(value)),
        ArgType::String => match value {
            Value::Array(items) if items.len() == 1 => Value::String(stringify(&items[0])),
            other => Value::String(stringify(other)),
        },
        ArgType::Int | ArgType::Float | ArgType::Bool => {
            let scalar = match value {
                Value::Array(items) if items.len() == 1 && is_scalar(&items[0]) => &items[0],
                other => other,
            };
            parse_scalar(arg_type, scalar).unwrap_or_else(|| scalar.clone())
        }
    }
}

fn to_string_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(|v| Value::String(stringify(v))).collect(),
        other => vec![Value::String(stringify(other))],
    }
}

/// Text form of a value: strings verbatim, everything else as compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn parse_scalar(arg_type: ArgType, value: &Value) -> Option<Value> {
    let text = value.as_str()?.trim();
    match arg_type {
        ArgType::Int => text.parse::<i64>().ok().map(Value::from),
        ArgType::Float => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        ArgType::Bool => match text.to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        ArgType::String | ArgType::StringList => None,
    }
}

/// Check argument keys against the registry.
pub fn validate_args(
    specs: &ToolSpecRegistry,
    tool: &str,
    args: &ArgMap,
) -> Result<(), ValidationError> {
    let spec = specs
        .get(tool)
        .ok_or_else(|| ValidationError::UnknownTool(tool.to_string()))?;

    let missing: Vec<String> = spec
        .required_args()
        .filter(|a| !args.contains_key(&a.name))
        .map(|a| a.name.clone())
        .collect();

    let mut unexpected: Vec<String> = args
        .keys()
        .filter(|k| spec.arg(k).is_none())
        .cloned()
        .collect();
    unexpected.sort();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::InvalidArgs {
            tool: tool.to_string(),
            missing,
            unexpected,
        })
    }
}
