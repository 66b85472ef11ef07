//! Step Normalization & Deduplication
//!
//! Two steps are duplicates when they call the same tool with arguments
//! that are equal after normalization: object keys sorted, arrays sorted,
//! scalars untouched. Key order and list order therefore never matter;
//! values always do.

use std::collections::HashSet;

use serde_json::{Map, Value};

use dataplan_core::PlanStep;

/// Canonical form of a JSON value for comparison.
///
/// Arrays are ordered by the canonical text of their normalized elements,
/// which gives a total order over mixed-type arrays.
pub fn normalize_args(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let normalized: Map<String, Value> = keys
                .into_iter()
                .map(|k| (k.clone(), normalize_args(&map[k])))
                .collect();
            Value::Object(normalized)
        }
        Value::Array(items) => {
            let mut normalized: Vec<(String, Value)> = items
                .iter()
                .map(|v| {
                    let v = normalize_args(v);
                    (v.to_string(), v)
                })
                .collect();
            normalized.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Array(normalized.into_iter().map(|(_, v)| v).collect())
        }
        scalar => scalar.clone(),
    }
}

/// `(tool, canonical JSON of the normalized args)`.
pub fn step_signature(step: &PlanStep) -> (String, String) {
    let args = normalize_args(&Value::Object(step.args.clone()));
    (step.tool.clone(), args.to_string())
}

/// Drop steps whose signature was already seen, keeping first occurrences
/// in their original order.
pub fn deduplicate_steps(steps: Vec<PlanStep>) -> Vec<PlanStep> {
    let mut seen = HashSet::new();
    let before = steps.len();
    let deduped: Vec<PlanStep> = steps
        .into_iter()
        .filter(|step| seen.insert(step_signature(step)))
        .collect();
    if deduped.len() < before {
        tracing::debug!(removed = before - deduped.len(), "Removed duplicate plan steps");
    }
    deduped
}
