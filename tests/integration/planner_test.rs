//! Planner Integration Tests
//!
//! Model output in, plan steps out:
//! - Strict and fallback parsing of realistic replies
//! - Deduplication after parsing
//! - Plan logging artifacts on disk

use serde_json::json;

use dataplan::services::planner::{parse_plan, MemorySink, NullSink, PlanLogger, Planner};
use dataplan::AppError;
use dataplan_core::DatasetProfile;
use dataplan_tools::builtin_specs;

use super::support::{sample_dataset, ScriptedProvider};

fn profile() -> DatasetProfile {
    DatasetProfile::from_dataset(&sample_dataset())
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_fallback_recovers_plan_from_prose_and_fences() {
    let reply = r#"Here's a plan that should answer your question.

```json
[
  {"description": "Look at the data", "tool": "eda_overview", "args": {}},
  {"description": "Compare age by gender", "tool": "boxplot", "args": {"x": "gender", "y": "age"}}
]
```

Each step builds on the previous one."#;

    let sink = MemorySink::new();
    let steps = parse_plan(reply, &sink).unwrap();

    let tools: Vec<&str> = steps.iter().map(|s| s.tool.as_str()).collect();
    assert_eq!(tools, vec!["eda_overview", "boxplot"]);
    assert_eq!(steps[1].args["x"], json!("gender"));
    assert!(sink.get("parse_warn").is_some());
    assert!(sink.get("parse_error").is_none());
}

#[test]
fn test_text_without_array_is_parse_error() {
    let reply = "I'm sorry, I can't determine a plan for this dataset.";
    let err = parse_plan(reply, &NullSink).unwrap_err();
    assert_eq!(err.raw, reply);
}

#[test]
fn test_array_of_scalars_is_not_extracted() {
    let reply = "The relevant columns are [\"age\", \"income\"].";
    assert!(parse_plan(reply, &NullSink).is_err());
}

#[test]
fn test_parse_is_all_or_nothing() {
    let reply = r#"[
        {"description": "fine", "tool": "eda_overview", "args": {}},
        {"description": "broken", "args": {}}
    ]"#;
    assert!(parse_plan(reply, &NullSink).is_err());
}

// ============================================================================
// Planner pipeline
// ============================================================================

#[tokio::test]
async fn test_planner_deduplicates_reordered_lists() {
    let reply = r#"[
        {"description": "Stats", "tool": "summary_stats", "args": {"columns": ["age", "income"]}},
        {"description": "Stats again", "tool": "summary_stats", "args": {"columns": ["income", "age"]}},
        {"description": "Histogram", "tool": "histogram", "args": {"columns": ["age"], "bins": 10}},
        {"description": "Histogram again", "tool": "histogram", "args": {"bins": 10, "columns": ["age"]}}
    ]"#;
    let provider = ScriptedProvider::new([reply]);
    let planner = Planner::new(provider.clone(), builtin_specs());

    let steps = planner
        .plan("How are age and income distributed?", &profile(), &NullSink)
        .await
        .unwrap();

    let descriptions: Vec<&str> = steps.iter().map(|s| s.description.as_str()).collect();
    assert_eq!(descriptions, vec!["Stats", "Histogram"]);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("TOOL SPECIFICATION (strict):"));
    assert!(prompts[0].contains("- t_test: group_column[str] (required)"));
    assert!(prompts[0].contains("How are age and income distributed?"));
    assert!(prompts[0].contains("\"income\""));
}

#[tokio::test]
async fn test_planner_surfaces_parse_error() {
    let provider = ScriptedProvider::new(["Let me think about that..."]);
    let planner = Planner::new(provider, builtin_specs());

    let err = planner.plan("q", &profile(), &NullSink).await.unwrap_err();
    assert!(matches!(err, AppError::PlanParse(_)));
    assert!(err.to_string().starts_with("Plan parse error:"));
}

#[tokio::test]
async fn test_plan_logger_writes_stage_files() {
    let tmp = tempfile::tempdir().unwrap();
    let logger = PlanLogger::new(tmp.path(), "1234-abcd");
    let reply = "Plan:\n[{\"description\": \"Overview\", \"tool\": \"eda_overview\"}]";
    let provider = ScriptedProvider::new([reply]);
    let planner = Planner::new(provider, builtin_specs());

    planner.plan("q", &profile(), &logger).await.unwrap();

    let dir = tmp.path().join("plan_1234abcd");
    assert_eq!(logger.dir(), dir.as_path());
    for name in ["prompt.txt", "raw.txt", "parse_warn.txt", "clean.json", "dedup.json"] {
        assert!(dir.join(name).exists(), "missing {name}");
    }
    assert_eq!(std::fs::read_to_string(dir.join("raw.txt")).unwrap(), reply);

    let dedup: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("dedup.json")).unwrap()).unwrap();
    assert_eq!(dedup[0]["tool"], "eda_overview");
    assert_eq!(dedup[0]["args"], json!({}));
}
