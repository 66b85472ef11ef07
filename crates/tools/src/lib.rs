//! dataplan Tools
//!
//! Everything that defines what a plan step may call:
//!
//! - `spec` - Tool specification registry (`ToolSpecRegistry`, `builtin_specs`)
//! - `coercion` - Argument coercion and key validation (`coerce_args`, `validate_args`)
//! - `trait_def` - Dispatch table and closure tools (`ToolRegistry`, `FunctionTool`)
//! - `impls` - Built-in tools (eda_overview, summary_stats, boxplot, histogram, t_test)
//!
//! The orchestrator that drives these lives in the main crate.

pub mod coercion;
pub mod impls;
pub mod spec;
pub mod trait_def;

// ── Specifications ─────────────────────────────────────────────────────
pub use spec::{builtin_specs, ArgSpec, ArgType, ToolSpec, ToolSpecRegistry};

// ── Coercion & Validation ──────────────────────────────────────────────
pub use coercion::{coerce_args, coerce_value, validate_args, ValidationError};

// ── Dispatch ───────────────────────────────────────────────────────────
pub use impls::register_builtin_tools;
pub use trait_def::{FunctionTool, FunctionToolHandler, SyncToolHandler, ToolFuture, ToolRegistry};
