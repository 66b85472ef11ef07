//! dataplan
//!
//! Turns a free-text analysis question and a tabular dataset into a
//! validated, deduplicated plan of tool calls, then executes it step by step.
//! It includes:
//! - The planner (prompting, plan parsing, deduplication, plan logging)
//! - The execution orchestrator
//! - Dataset loading and configuration
//! - Report models and utilities

pub mod datasets;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::report::{AnalysisReport, StepReport};
pub use models::settings::{AppConfig, SettingsUpdate};
pub use services::{AnalysisService, Orchestrator, PlanParseError, Planner};
pub use storage::ConfigService;
pub use utils::error::{AppError, AppResult};
