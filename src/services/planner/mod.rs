//! Planner
//!
//! Question + dataset profile in, deduplicated `PlanStep`s out:
//! prompt construction, one model call, parsing, then deduplication.
//! Each stage is written to a `PlanSink`.

pub mod logging;
pub mod parsing;
pub mod processing;
pub mod prompting;

use std::sync::Arc;

use serde_json::Value;

use dataplan_core::{DatasetProfile, PlanStep};
use dataplan_llm::LlmProvider;
use dataplan_tools::ToolSpecRegistry;

use crate::utils::error::AppResult;

pub use logging::{MemorySink, NullSink, PlanLogger, PlanSink};
pub use parsing::{extract_json_array, parse_plan, PlanParseError};
pub use processing::{deduplicate_steps, normalize_args, step_signature};
pub use prompting::{build_example, build_example_block, build_prompt, DEFAULT_EXAMPLE_TOOLS};

/// Model-backed planner.
pub struct Planner {
    provider: Arc<dyn LlmProvider>,
    specs: Arc<ToolSpecRegistry>,
    example_tools: Vec<String>,
}

impl Planner {
    pub fn new(provider: Arc<dyn LlmProvider>, specs: Arc<ToolSpecRegistry>) -> Self {
        Self {
            provider,
            specs,
            example_tools: DEFAULT_EXAMPLE_TOOLS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Tools rendered in the prompt's example block.
    pub fn with_example_tools(mut self, tools: Vec<String>) -> Self {
        self.example_tools = tools;
        self
    }

    pub fn build_prompt(&self, question: &str, profile: &DatasetProfile) -> String {
        build_prompt(&self.specs, question, profile, self.example_tools.as_slice())
    }

    /// Produce a plan for `question`.
    ///
    /// Model and parse failures are fatal for the run; there is no retry.
    pub async fn plan(
        &self,
        question: &str,
        profile: &DatasetProfile,
        sink: &dyn PlanSink,
    ) -> AppResult<Vec<PlanStep>> {
        let prompt = self.build_prompt(question, profile);
        sink.text("prompt", &prompt);

        tracing::info!(
            provider = self.provider.name(),
            model = self.provider.model(),
            "Requesting plan"
        );
        let raw = self.provider.generate(&prompt).await?;
        sink.text("raw", &raw);

        let steps = parse_plan(&raw, sink)?;
        sink.json("clean", &steps_json(&steps));

        let parsed = steps.len();
        let steps = deduplicate_steps(steps);
        sink.json("dedup", &steps_json(&steps));

        tracing::info!(parsed, kept = steps.len(), "Plan ready");
        Ok(steps)
    }
}

fn steps_json(steps: &[PlanStep]) -> Value {
    serde_json::to_value(steps).unwrap_or(Value::Null)
}
