//! End-to-End Integration Tests
//!
//! Dataset file on disk, scripted model reply, built-in tools, JSON report.

use std::sync::Arc;

use serde_json::json;

use dataplan::{AnalysisService, AppError, ConfigService, SettingsUpdate};
use dataplan_tools::ToolRegistry;

use super::support::{sample_dataset, test_config, ScriptedProvider, SAMPLE_CSV};

fn service(dir: &std::path::Path, replies: Vec<&str>) -> AnalysisService {
    AnalysisService::with_components(
        test_config(dir),
        ScriptedProvider::new(replies),
        Arc::new(ToolRegistry::with_builtin_tools()),
    )
}

#[tokio::test]
async fn test_summary_stats_scalar_column_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let reply = r#"[{"description":"d1","tool":"summary_stats","args":{"columns":"age"}}]"#;
    let service = service(tmp.path(), vec![reply]);

    let report = service.analyze(sample_dataset(), "Summarise age").await.unwrap();

    assert_eq!(report.steps.len(), 1);
    let entry = &report.steps[0];
    assert_eq!(entry.step.description, "d1");
    assert_eq!(entry.step.tool, "summary_stats");
    assert!(entry.result.is_success(), "{:?}", entry.result.error_message());
    assert_eq!(entry.result.step_id(), entry.step.step_id);

    let records = entry.result.output_preview().unwrap().as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["column"], "age");
    assert_eq!(records[0]["count"], 10);
    assert_eq!(records[0]["mean"].as_f64().unwrap(), 38.2);
    assert_eq!(records[0]["min"].as_f64().unwrap(), 23.0);
    assert_eq!(records[0]["max"].as_f64().unwrap(), 60.0);
}

#[tokio::test]
async fn test_analyze_csv_file_with_mixed_outcomes() {
    let tmp = tempfile::tempdir().unwrap();
    let data_path = tmp.path().join("people.csv");
    std::fs::write(&data_path, SAMPLE_CSV).unwrap();

    let reply = r#"Sure, here is the plan:
```json
[
  {"description": "Overview", "tool": "eda_overview", "args": {}},
  {"description": "Age by gender", "tool": "boxplot", "args": {"x": "gender", "y": "age"}},
  {"description": "Age by gender, again", "tool": "boxplot", "args": {"y": "age", "x": "gender"}},
  {"description": "Regression", "tool": "linear_regression", "args": {"y": "income"}},
  {"description": "Compare income", "tool": "t_test", "args": {"group_column": "gender", "value_column": "income"}}
]
```"#;
    let service = service(tmp.path(), vec![reply]);

    let report = service
        .analyze_file(&data_path, "Does income differ by gender?")
        .await
        .unwrap();

    let tools: Vec<&str> = report.steps.iter().map(|s| s.step.tool.as_str()).collect();
    assert_eq!(tools, vec!["eda_overview", "boxplot", "linear_regression", "t_test"]);
    assert_eq!(report.num_succeeded(), 3);
    assert_eq!(report.num_failed(), 1);
    assert_eq!(
        report.steps[2].result.error_message(),
        Some("Tool 'linear_regression' not found")
    );

    let run_artifacts = tmp.path().join("artifacts").join(&report.run_id);
    let boxplot = report.steps[1].result.artifact_path().unwrap();
    assert!(boxplot.starts_with(&run_artifacts));
    assert!(boxplot.exists());
    let ttest = report.steps[3].result.artifact_path().unwrap();
    assert_eq!(ttest.extension().unwrap(), "json");

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["question"], "Does income differ by gender?");
    assert_eq!(json["steps"][2]["result"]["status"], "error");
    assert!(json["steps"][2]["result"].get("output_preview").is_none());
    assert_eq!(json["steps"][3]["result"]["output_preview"]["equal_var"], json!(false));

    let plan_dir = tmp
        .path()
        .join("logs")
        .join(format!("plan_{}", report.run_id.replace('-', "")));
    assert!(plan_dir.join("parse_warn.txt").exists());
}

#[tokio::test]
async fn test_parse_failure_aborts_run() {
    let tmp = tempfile::tempdir().unwrap();
    let service = service(tmp.path(), vec!["I need more information."]);

    let err = service.analyze(sample_dataset(), "q").await.unwrap_err();
    assert!(matches!(err, AppError::PlanParse(_)));
    assert!(!tmp.path().join("artifacts").exists());
}

#[tokio::test]
async fn test_model_failure_aborts_run() {
    let tmp = tempfile::tempdir().unwrap();
    let service = service(tmp.path(), vec![]);

    let err = service.analyze(sample_dataset(), "q").await.unwrap_err();
    assert!(matches!(err, AppError::Llm(_)));
}

#[tokio::test]
async fn test_execute_saved_plan_from_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("config.json");
    let mut config_service = ConfigService::open(&config_path).unwrap();
    config_service
        .update_config(SettingsUpdate {
            artifacts_dir: Some(tmp.path().join("out")),
            plan_logging_enabled: Some(false),
            ..Default::default()
        })
        .unwrap();

    let config = ConfigService::open(&config_path).unwrap().get_config_clone();
    let service = AnalysisService::with_components(
        config,
        ScriptedProvider::new(Vec::<String>::new()),
        Arc::new(ToolRegistry::with_builtin_tools()),
    );

    let plan = r#"[{"description": "Income histogram", "tool": "histogram", "args": {"columns": ["income"], "bins": 3}}]"#;
    let report = service.execute_plan_text(sample_dataset(), plan).await.unwrap();

    assert_eq!(report.question, "");
    assert!(report.steps[0].result.is_success());
    let artifact = report.steps[0].result.artifact_path().unwrap();
    assert!(artifact.starts_with(tmp.path().join("out")));
    assert!(!tmp.path().join("logs").exists());
}
