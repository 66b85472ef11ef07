//! Integration Tests Module
//!
//! Exercises the planner, the orchestrator and the analysis service through
//! the public API, with a scripted model provider in place of a live model.

// Shared doubles and fixtures
mod support;

// Model output parsing, deduplication and plan logging
mod planner_test;

// Dispatch, validation and per-step failure isolation
mod orchestrator_test;

// Full runs: dataset file in, report out
mod end_to_end_test;
