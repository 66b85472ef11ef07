//! Prompt Construction
//!
//! Fills the system prompt template with the tool schema, a block of example
//! steps, the question and the dataset profile.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;

use dataplan_core::{ArgMap, DatasetProfile};
use dataplan_tools::{ArgType, ToolSpecRegistry};

const SYSTEM_PROMPT: &str = include_str!("prompts/system.prompt");

/// Tools shown as examples when none are configured.
pub const DEFAULT_EXAMPLE_TOOLS: &[&str] = &["summary_stats", "boxplot"];

/// Example step, serialized in the key order the model should produce.
#[derive(Debug, Serialize)]
struct ExampleStep<'a> {
    description: String,
    tool: &'a str,
    args: ArgMap,
}

fn placeholder(arg_type: ArgType) -> Value {
    match arg_type {
        ArgType::String => Value::from("<col>"),
        ArgType::StringList => Value::from(vec!["<col>"]),
        ArgType::Float => Value::from(0.0),
        ArgType::Int => Value::from(0),
        ArgType::Bool => Value::from(false),
    }
}

fn example_step<'a>(specs: &ToolSpecRegistry, tool: &'a str) -> Option<ExampleStep<'a>> {
    let spec = specs.get(tool)?;
    let mut args = ArgMap::new();
    for arg in &spec.args {
        // One optional argument is shown only while nothing else has been added
        if arg.required || args.is_empty() {
            args.insert(arg.name.clone(), placeholder(arg.arg_type));
        }
    }
    Some(ExampleStep {
        description: format!("Example use of '{}'", tool),
        tool,
        args,
    })
}

/// A minimal valid step for `tool`, or `None` if it is not registered.
pub fn build_example(specs: &ToolSpecRegistry, tool: &str) -> Option<Value> {
    example_step(specs, tool).and_then(|step| serde_json::to_value(step).ok())
}

/// Pretty JSON array of example steps. Unregistered names are skipped.
pub fn build_example_block<S: AsRef<str>>(specs: &ToolSpecRegistry, tools: &[S]) -> String {
    let examples: Vec<ExampleStep<'_>> = tools
        .iter()
        .filter_map(|t| example_step(specs, t.as_ref()))
        .collect();
    serde_json::to_string_pretty(&examples).unwrap_or_else(|_| "[]".to_string())
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder pattern"))
}

/// Render the planning prompt.
///
/// Substitution is a single pass over the template, so braces or
/// placeholder-like text inside the question or profile are left alone.
pub fn build_prompt<S: AsRef<str>>(
    specs: &ToolSpecRegistry,
    question: &str,
    profile: &DatasetProfile,
    example_tools: &[S],
) -> String {
    let schema_block = specs.schema_block();
    let example_block = build_example_block(specs, example_tools);
    let profile_json = profile.to_pretty_json();

    placeholder_pattern()
        .replace_all(SYSTEM_PROMPT, |caps: &Captures<'_>| match &caps[1] {
            "schema_block" => schema_block.clone(),
            "example_block" => example_block.clone(),
            "question" => question.to_string(),
            "profile_json" => profile_json.clone(),
            _ => caps[0].to_string(),
        })
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataplan_core::{Column, Dataset};
    use dataplan_tools::{builtin_specs, ArgSpec, ToolSpec};
    use serde_json::json;

    fn profile() -> DatasetProfile {
        let ds = Dataset::new(vec![
            Column::numeric("age", vec![Some(31.0), Some(45.0)]),
            Column::text("gender", vec![Some("f".into()), Some("m".into())]),
        ])
        .unwrap();
        DatasetProfile::from_dataset(&ds)
    }

    #[test]
    fn test_build_example_required_only() {
        let example = build_example(&builtin_specs(), "summary_stats").unwrap();
        assert_eq!(
            example,
            json!({
                "description": "Example use of 'summary_stats'",
                "tool": "summary_stats",
                "args": {"columns": ["<col>"]}
            })
        );
    }

    #[test]
    fn test_build_example_optional_when_first() {
        let specs = ToolSpecRegistry::new(vec![ToolSpec::new(
            "scatter",
            "",
            vec![
                ArgSpec::optional("alpha", ArgType::Float, ""),
                ArgSpec::required("x", ArgType::String, ""),
                ArgSpec::optional("log", ArgType::Bool, ""),
            ],
        )]);
        let example = build_example(&specs, "scatter").unwrap();
        assert_eq!(example["args"], json!({"alpha": 0.0, "x": "<col>"}));
    }

    #[test]
    fn test_build_example_unknown_tool() {
        assert!(build_example(&builtin_specs(), "regression").is_none());
    }

    #[test]
    fn test_example_block_key_order() {
        let block = build_example_block(&builtin_specs(), DEFAULT_EXAMPLE_TOOLS);
        let desc = block.find("\"description\"").unwrap();
        let tool = block.find("\"tool\"").unwrap();
        let args = block.find("\"args\"").unwrap();
        assert!(desc < tool && tool < args);

        let parsed: Value = serde_json::from_str(&block).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["args"], json!({"x": "<col>", "y": "<col>"}));
    }

    #[test]
    fn test_build_prompt_fills_placeholders() {
        let prompt = build_prompt(
            &builtin_specs(),
            "Does age differ by gender?",
            &profile(),
            DEFAULT_EXAMPLE_TOOLS,
        );
        assert!(prompt.contains("TOOL SPECIFICATION (strict):"));
        assert!(prompt.contains("Does age differ by gender?"));
        assert!(prompt.contains("Example use of 'boxplot'"));
        assert!(prompt.contains("\"gender\""));
        assert!(!prompt.contains("{{"));
        assert_eq!(prompt, prompt.trim());
    }

    #[test]
    fn test_question_text_is_not_reinterpreted() {
        let prompt = build_prompt(
            &builtin_specs(),
            "What about {{schema_block}} and {braces}?",
            &profile(),
            &["eda_overview"],
        );
        assert!(prompt.contains("What about {{schema_block}} and {braces}?"));
        assert_eq!(prompt.matches("TOOL SPECIFICATION (strict):").count(), 1);
    }
}
