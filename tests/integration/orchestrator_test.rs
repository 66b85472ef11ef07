//! Orchestrator Integration Tests
//!
//! Built-in tools behind the dispatcher:
//! - Failure isolation across a multi-step plan
//! - Validation against every registered tool spec
//! - Coercion of drifted argument shapes before dispatch

use std::sync::Arc;

use serde_json::{json, Value};

use dataplan::Orchestrator;
use dataplan_core::{AnalysisContext, ArgMap, PlanStep};
use dataplan_tools::{builtin_specs, FunctionTool, ToolRegistry};

use super::support::sample_dataset;

fn step(tool: &str, args: Value) -> PlanStep {
    PlanStep::new(format!("Run {}", tool), tool, args.as_object().cloned().unwrap())
}

fn builtin_orchestrator() -> Orchestrator {
    Orchestrator::new(Arc::new(ToolRegistry::with_builtin_tools()), builtin_specs())
}

fn context(dir: &std::path::Path) -> AnalysisContext {
    AnalysisContext::new("run-integration", sample_dataset(), dir)
}

#[tokio::test]
async fn test_failing_middle_step_does_not_stop_the_run() {
    let tmp = tempfile::tempdir().unwrap();
    let orch = builtin_orchestrator();
    let steps = vec![
        step("eda_overview", json!({})),
        step("summary_stats", json!({"columns": ["salary"]})),
        step("histogram", json!({"columns": ["age"], "bins": 5})),
    ];

    let results = orch.run_plan(&steps, &context(tmp.path())).await;

    assert_eq!(results.len(), 3);
    for (step, result) in steps.iter().zip(&results) {
        assert_eq!(result.step_id(), step.step_id);
    }
    assert!(results[0].is_success());
    assert!(!results[1].is_success());
    assert!(results[1].error_message().unwrap().contains("salary"));
    assert!(results[1].output_preview().is_none());
    assert!(results[2].is_success());
    assert!(results[2].artifact_path().unwrap().exists());
}

#[tokio::test]
async fn test_missing_required_args_rejected_for_every_tool() {
    let tmp = tempfile::tempdir().unwrap();
    let orch = builtin_orchestrator();
    let ctx = context(tmp.path());

    for spec in builtin_specs().iter() {
        let required: Vec<&str> = spec.required_args().map(|a| a.name.as_str()).collect();
        if required.is_empty() {
            continue;
        }
        let result = orch.run_step(&step(&spec.name, json!({})), &ctx).await;
        let message = result.error_message().unwrap_or_default().to_string();
        assert!(
            message.starts_with("Arg validation failed:"),
            "{}: {}",
            spec.name,
            message
        );
        for name in required {
            assert!(message.contains(&format!("'{}'", name)), "{}: {}", spec.name, message);
        }
    }
}

#[tokio::test]
async fn test_undeclared_args_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let orch = builtin_orchestrator();
    let result = orch
        .run_step(
            &step("boxplot", json!({"x": "gender", "y": "age", "hue": "region"})),
            &context(tmp.path()),
        )
        .await;
    let message = result.error_message().unwrap();
    assert!(message.contains("Unexpected arg(s) ['hue'] for tool 'boxplot'."));
}

#[tokio::test]
async fn test_unregistered_tool_reports_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let orch = builtin_orchestrator();
    let result = orch
        .run_step(&step("anova", json!({"columns": ["age"]})), &context(tmp.path()))
        .await;
    assert_eq!(result.error_message(), Some("Tool 'anova' not found"));
}

#[tokio::test]
async fn test_drifted_shapes_are_coerced_before_dispatch() {
    let tmp = tempfile::tempdir().unwrap();
    let orch = builtin_orchestrator();
    let ctx = context(tmp.path());

    let steps = vec![
        // List-typed argument given as a bare string
        step("summary_stats", json!({"columns": "age", "by": ["gender"]})),
        // Typed scalars given as strings
        step(
            "t_test",
            json!({"group_column": "gender", "value_column": "income", "equal_var": "TRUE"}),
        ),
        step("histogram", json!({"columns": "income", "bins": "4"})),
    ];
    let results = orch.run_plan(&steps, &ctx).await;
    for result in &results {
        assert!(result.is_success(), "{:?}", result.error_message());
    }

    let grouped = results[0].output_preview().unwrap().as_array().unwrap();
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped[0]["gender"], "f");
    assert_eq!(grouped[0]["age_count"], 5);

    let ttest = results[1].output_preview().unwrap();
    assert_eq!(ttest["equal_var"], true);
    assert_eq!(ttest["df"].as_f64().unwrap(), 8.0);

    let hist = results[2].output_preview().unwrap();
    assert_eq!(hist[0]["counts"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_registry_of_doubles() {
    let tmp = tempfile::tempdir().unwrap();
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FunctionTool::from_fn(
        "eda_overview",
        |ctx: &AnalysisContext, _args: &ArgMap| {
            Ok(dataplan_core::ToolOutput::preview(json!(ctx.dataset().num_rows())))
        },
    )));
    let orch = Orchestrator::new(Arc::new(registry), builtin_specs());

    let results = orch
        .run_plan(
            &[
                step("eda_overview", json!({})),
                step("summary_stats", json!({"columns": ["age"]})),
            ],
            &context(tmp.path()),
        )
        .await;
    assert_eq!(results[0].output_preview(), Some(&json!(10)));
    assert_eq!(
        results[1].error_message(),
        Some("Tool 'summary_stats' not found")
    );
}
