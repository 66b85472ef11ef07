//! Execution Orchestrator
//!
//! Dispatches plan steps to registered tools through the same spec registry
//! the planner prompts with.

mod runner;

pub use runner::Orchestrator;
