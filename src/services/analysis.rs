//! Analysis Service
//!
//! Wires the planner and the orchestrator into one run:
//! profile → plan → execute → report.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use dataplan_core::{AnalysisContext, Dataset, DatasetProfile, PlanStep};
use dataplan_llm::{LlmProvider, OllamaProvider};
use dataplan_tools::{builtin_specs, ToolRegistry};

use crate::datasets::load_dataset;
use crate::models::report::AnalysisReport;
use crate::models::settings::AppConfig;
use crate::services::orchestrator::Orchestrator;
use crate::services::planner::{deduplicate_steps, parse_plan, NullSink, PlanLogger, PlanSink, Planner};
use crate::utils::error::{AppError, AppResult};

/// End-to-end analysis runner for one configuration.
pub struct AnalysisService {
    config: AppConfig,
    planner: Planner,
    orchestrator: Orchestrator,
}

impl AnalysisService {
    /// Build the service with the configured model provider and the
    /// built-in tools.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        config.validate().map_err(AppError::validation)?;
        let provider_config = config.provider_config().map_err(AppError::config)?;
        let provider = OllamaProvider::new(provider_config)?;
        Ok(Self::with_components(
            config,
            Arc::new(provider),
            Arc::new(ToolRegistry::with_builtin_tools()),
        ))
    }

    /// Build the service from explicit components.
    pub fn with_components(
        config: AppConfig,
        provider: Arc<dyn LlmProvider>,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        let planner =
            Planner::new(provider, builtin_specs()).with_example_tools(config.example_tools.clone());
        let orchestrator = Orchestrator::new(registry, builtin_specs());
        Self {
            config,
            planner,
            orchestrator,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Context for a new run. Artifacts go to `<artifacts_dir>/<run_id>`.
    pub fn new_context(&self, dataset: Arc<Dataset>, question: &str) -> AnalysisContext {
        let run_id = uuid::Uuid::new_v4().to_string();
        let artifacts_dir = self.config.artifacts_dir.join(&run_id);
        AnalysisContext::new(run_id, dataset, artifacts_dir).with_question(question)
    }

    fn plan_sink(&self, run_id: &str) -> Box<dyn PlanSink> {
        if self.config.plan_logging_enabled {
            let logger = PlanLogger::new(&self.config.logs_dir, run_id);
            tracing::debug!(dir = %logger.dir().display(), "Plan logging enabled");
            Box::new(logger)
        } else {
            Box::new(NullSink)
        }
    }

    /// Plan only: model call, parse, dedup.
    pub async fn plan(&self, profile: &DatasetProfile, question: &str) -> AppResult<Vec<PlanStep>> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let sink = self.plan_sink(&run_id);
        self.planner.plan(question, profile, sink.as_ref()).await
    }

    /// Load `path` and run the full pipeline.
    pub async fn analyze_file(&self, path: &Path, question: &str) -> AppResult<AnalysisReport> {
        let dataset = load_dataset(path)?;
        self.analyze(Arc::new(dataset), question).await
    }

    /// Full pipeline on an in-memory dataset.
    pub async fn analyze(&self, dataset: Arc<Dataset>, question: &str) -> AppResult<AnalysisReport> {
        let ctx = self.new_context(dataset, question);
        tracing::info!(run_id = %ctx.run_id(), "Starting analysis run");

        let run = async {
            let sink = self.plan_sink(ctx.run_id());
            let steps = self.planner.plan(question, ctx.profile(), sink.as_ref()).await?;
            let results = self.orchestrator.run_plan(&steps, &ctx).await;
            Ok(AnalysisReport::new(ctx.run_id(), question, steps, results))
        };
        self.with_run_timeout(run).await
    }

    /// Execute a saved model response (or a bare step array) without
    /// calling the model. The text goes through the same parser and
    /// deduplication as a live response.
    pub async fn execute_plan_text(
        &self,
        dataset: Arc<Dataset>,
        plan_text: &str,
    ) -> AppResult<AnalysisReport> {
        let ctx = self.new_context(dataset, "");
        let run = async {
            let sink = self.plan_sink(ctx.run_id());
            sink.text("raw", plan_text);
            let steps = parse_plan(plan_text, sink.as_ref())?;
            let steps = deduplicate_steps(steps);
            let results = self.orchestrator.run_plan(&steps, &ctx).await;
            Ok(AnalysisReport::new(ctx.run_id(), "", steps, results))
        };
        self.with_run_timeout(run).await
    }

    /// Bound `run` by `run_timeout_secs`. The deadline also covers tool
    /// execution; a tool still running when it passes is left to finish on
    /// the blocking pool and its result is discarded.
    async fn with_run_timeout<F>(&self, run: F) -> AppResult<AnalysisReport>
    where
        F: std::future::Future<Output = AppResult<AnalysisReport>>,
    {
        let report = match self.config.run_timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
                .await
                .map_err(|_| AppError::Timeout(secs))??,
            None => run.await?,
        };
        tracing::info!(
            run_id = %report.run_id,
            succeeded = report.num_succeeded(),
            failed = report.num_failed(),
            "Analysis run finished"
        );
        Ok(report)
    }
}
