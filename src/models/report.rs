//! Report Models
//!
//! The JSON report produced for one analysis run.

use serde::{Deserialize, Serialize};

use dataplan_core::{ExecutionResult, PlanStep};

/// One executed step with its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub step: PlanStep,
    pub result: ExecutionResult,
}

/// Outcome of an analysis run, in plan order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: String,
    pub question: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
    pub steps: Vec<StepReport>,
}

impl AnalysisReport {
    /// Pair each step with its result. Both slices are in plan order.
    pub fn new(
        run_id: impl Into<String>,
        question: impl Into<String>,
        steps: Vec<PlanStep>,
        results: Vec<ExecutionResult>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            question: question.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            steps: steps
                .into_iter()
                .zip(results)
                .map(|(step, result)| StepReport { step, result })
                .collect(),
        }
    }

    pub fn num_succeeded(&self) -> usize {
        self.steps.iter().filter(|s| s.result.is_success()).count()
    }

    pub fn num_failed(&self) -> usize {
        self.steps.len() - self.num_succeeded()
    }
}
