//! Services
//!
//! Business logic for the analysis pipeline. The CLI calls into
//! `AnalysisService`; the planner and orchestrator are usable on their own.

pub mod analysis;
pub mod orchestrator;
pub mod planner;

pub use analysis::AnalysisService;
pub use orchestrator::Orchestrator;
pub use planner::{PlanLogger, PlanParseError, PlanSink, Planner};
