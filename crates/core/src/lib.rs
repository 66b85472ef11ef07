//! dataplan Core
//!
//! Foundational types shared by every crate in the dataplan workspace:
//! the dataset model, the per-run analysis context, plan and result records,
//! and the tool capability trait. This crate has no dependency on model
//! providers, tool bodies or the planner.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `dataset` - Column-oriented tabular data (`Dataset`, `Column`)
//! - `profile` - Dataset profile embedded in prompts (`DatasetProfile`)
//! - `stats` - Small numeric helpers
//! - `context` - Read-only per-run context (`AnalysisContext`)
//! - `plan` - `PlanStep` and `ExecutionResult`
//! - `tool_trait` - Tool capability abstraction (`AnalysisTool`, `ToolOutput`)

pub mod context;
pub mod dataset;
pub mod error;
pub mod plan;
pub mod profile;
pub mod stats;
pub mod tool_trait;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Data Model ─────────────────────────────────────────────────────────
pub use dataset::{Column, ColumnData, Dataset};
pub use profile::{ColumnProfile, DatasetProfile};

// ── Context ────────────────────────────────────────────────────────────
pub use context::AnalysisContext;

// ── Plans & Results ────────────────────────────────────────────────────
pub use plan::{ArgMap, ExecutionResult, ExecutionStatus, PlanStep};

// ── Tool Trait ─────────────────────────────────────────────────────────
pub use tool_trait::{AnalysisTool, ToolOutput};
