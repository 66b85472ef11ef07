//! Plan Runner
//!
//! Executes plan steps one at a time against a shared read-only context.
//! Every step yields exactly one `ExecutionResult`; a failing or panicking
//! tool produces an error result and later steps still run.
//!
//! Tool bodies may block, so each one runs on the blocking pool. The
//! awaiting run future stays pollable and an enclosing timeout can fire
//! while a tool is still busy.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::Handle;

use dataplan_core::{AnalysisContext, ExecutionResult, PlanStep, ToolOutput};
use dataplan_tools::{coerce_args, validate_args, ToolRegistry, ToolSpecRegistry};

/// Sequential plan executor.
pub struct Orchestrator {
    registry: Arc<ToolRegistry>,
    specs: Arc<ToolSpecRegistry>,
}

impl Orchestrator {
    pub fn new(registry: Arc<ToolRegistry>, specs: Arc<ToolSpecRegistry>) -> Self {
        Self { registry, specs }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn specs(&self) -> &ToolSpecRegistry {
        &self.specs
    }

    /// Run one step: lookup, coerce, validate, execute.
    pub async fn run_step(&self, step: &PlanStep, ctx: &AnalysisContext) -> ExecutionResult {
        let Some(tool) = self.registry.get(&step.tool) else {
            tracing::warn!(step_id = %step.step_id, tool = %step.tool, "Tool not found");
            return ExecutionResult::error(&step.step_id, format!("Tool '{}' not found", step.tool));
        };

        let args = coerce_args(&self.specs, &step.tool, &step.args);
        if let Err(e) = validate_args(&self.specs, &step.tool, &args) {
            tracing::warn!(step_id = %step.step_id, tool = %step.tool, error = %e, "Arg validation failed");
            return ExecutionResult::error(&step.step_id, format!("Arg validation failed: {}", e));
        }

        tracing::debug!(step_id = %step.step_id, tool = %step.tool, "Dispatching step");
        let started = Instant::now();
        let task_ctx = ctx.clone();
        let runtime = Handle::current();
        let outcome =
            tokio::task::spawn_blocking(move || runtime.block_on(tool.execute(&task_ctx, &args)))
                .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(ToolOutput { preview, artifact })) => {
                tracing::debug!(step_id = %step.step_id, tool = %step.tool, elapsed_ms, "Step succeeded");
                ExecutionResult::success(&step.step_id, preview, artifact)
            }
            Ok(Err(e)) => {
                tracing::warn!(step_id = %step.step_id, tool = %step.tool, error = %e, "Step failed");
                ExecutionResult::error(&step.step_id, e.to_string())
            }
            Err(join_error) if join_error.is_panic() => {
                let payload = join_error.into_panic();
                let message = panic_message(payload.as_ref());
                tracing::error!(step_id = %step.step_id, tool = %step.tool, panic = %message, "Tool panicked");
                ExecutionResult::error(
                    &step.step_id,
                    format!("Tool '{}' panicked: {}", step.tool, message),
                )
            }
            Err(join_error) => {
                tracing::error!(step_id = %step.step_id, tool = %step.tool, error = %join_error, "Tool task aborted");
                ExecutionResult::error(
                    &step.step_id,
                    format!("Tool '{}' did not complete: {}", step.tool, join_error),
                )
            }
        }
    }

    /// Run every step in order. The result list matches `steps` one to one.
    pub async fn run_plan(&self, steps: &[PlanStep], ctx: &AnalysisContext) -> Vec<ExecutionResult> {
        let mut results = Vec::with_capacity(steps.len());
        for step in steps {
            results.push(self.run_step(step, ctx).await);
        }

        let failed = results.iter().filter(|r| !r.is_success()).count();
        tracing::info!(
            steps = results.len(),
            succeeded = results.len() - failed,
            failed,
            "Plan executed"
        );
        results
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataplan_core::{ArgMap, Column, CoreError, Dataset};
    use dataplan_tools::{builtin_specs, ArgSpec, ArgType, FunctionTool, ToolSpec};
    use serde_json::json;
    use std::time::Duration;

    fn context() -> AnalysisContext {
        let ds = Dataset::new(vec![Column::numeric("age", vec![Some(1.0), Some(2.0)])]).unwrap();
        AnalysisContext::new("run-test", Arc::new(ds), std::env::temp_dir())
    }

    fn step(tool: &str, args: serde_json::Value) -> PlanStep {
        PlanStep::new("test step", tool, args.as_object().cloned().unwrap_or_default())
    }

    fn orchestrator(tools: Vec<FunctionTool>) -> Orchestrator {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(Arc::new(tool));
        }
        Orchestrator::new(Arc::new(registry), builtin_specs())
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let orch = orchestrator(vec![]);
        let s = step("regression", json!({}));
        let result = orch.run_step(&s, &context()).await;
        assert!(!result.is_success());
        assert_eq!(result.step_id(), s.step_id);
        assert_eq!(result.error_message(), Some("Tool 'regression' not found"));
    }

    #[tokio::test]
    async fn test_validation_failure_skips_tool() {
        let orch = orchestrator(vec![FunctionTool::from_fn("summary_stats", |_, _| {
            panic!("must not run")
        })]);
        let result = orch
            .run_step(&step("summary_stats", json!({"cols": ["age"]})), &context())
            .await;
        let message = result.error_message().unwrap();
        assert!(message.starts_with("Arg validation failed: "));
        assert!(message.contains("'columns'"));
        assert!(message.contains("'cols'"));
    }

    #[tokio::test]
    async fn test_tool_receives_coerced_args() {
        let orch = orchestrator(vec![FunctionTool::from_fn(
            "summary_stats",
            |_, args: &ArgMap| Ok(ToolOutput::preview(json!(args.clone()))),
        )]);
        let result = orch
            .run_step(&step("summary_stats", json!({"columns": "age"})), &context())
            .await;
        assert!(result.is_success());
        assert_eq!(result.output_preview(), Some(&json!({"columns": ["age"]})));
    }

    #[tokio::test]
    async fn test_tool_error_message_verbatim() {
        let orch = orchestrator(vec![FunctionTool::from_fn("eda_overview", |_, _| {
            Err(CoreError::tool("Column 'zzz' not found"))
        })]);
        let result = orch.run_step(&step("eda_overview", json!({})), &context()).await;
        assert_eq!(result.error_message(), Some("Column 'zzz' not found"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let orch = orchestrator(vec![
            FunctionTool::from_fn("eda_overview", |_, _| panic!("index out of range")),
            FunctionTool::from_fn("histogram", |_, _| Ok(ToolOutput::preview(json!("ok")))),
        ]);
        let steps = vec![
            step("eda_overview", json!({})),
            step("histogram", json!({"columns": ["age"]})),
        ];
        let results = orch.run_plan(&steps, &context()).await;
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].error_message(),
            Some("Tool 'eda_overview' panicked: index out of range")
        );
        assert!(results[1].is_success());
    }

    #[tokio::test]
    async fn test_run_plan_preserves_order() {
        let orch = orchestrator(vec![FunctionTool::from_fn("eda_overview", |_, _| {
            Ok(ToolOutput::default())
        })]);
        let steps: Vec<PlanStep> = (0..4).map(|_| step("eda_overview", json!({}))).collect();
        let results = orch.run_plan(&steps, &context()).await;
        let ids: Vec<&str> = results.iter().map(|r| r.step_id()).collect();
        let expected: Vec<&str> = steps.iter().map(|s| s.step_id.as_str()).collect();
        assert_eq!(ids, expected);
        assert!(results[0].output_preview().is_none());
        assert!(results[0].artifact_path().is_none());
    }

    #[tokio::test]
    async fn test_blocking_tool_leaves_runtime_free() {
        let orch = orchestrator(vec![FunctionTool::from_fn("eda_overview", |_, _| {
            std::thread::sleep(Duration::from_secs(2));
            Ok(ToolOutput::default())
        })]);
        let s = step("eda_overview", json!({}));
        let ctx = context();

        let started = Instant::now();
        let outcome =
            tokio::time::timeout(Duration::from_millis(200), orch.run_step(&s, &ctx)).await;
        assert!(outcome.is_err());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_custom_spec_registry() {
        let specs = Arc::new(ToolSpecRegistry::new(vec![ToolSpec::new(
            "row_count",
            "Number of rows",
            vec![ArgSpec::optional("column", ArgType::String, "")],
        )]));
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FunctionTool::from_fn(
            "row_count",
            |ctx: &AnalysisContext, _args: &ArgMap| {
                Ok(ToolOutput::preview(json!(ctx.dataset().num_rows())))
            },
        )));
        let orch = Orchestrator::new(Arc::new(registry), specs.clone());
        assert!(std::ptr::eq(orch.specs(), specs.as_ref()));

        let ok = orch
            .run_step(&step("row_count", json!({"column": "age"})), &context())
            .await;
        assert_eq!(ok.output_preview(), Some(&json!(2)));

        let rejected = orch
            .run_step(&step("row_count", json!({"rows": 1})), &context())
            .await;
        assert!(rejected
            .error_message()
            .unwrap()
            .starts_with("Arg validation failed:"));
    }

    #[test]
    fn test_panic_message_payloads() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
