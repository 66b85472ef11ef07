//! Data Models
//!
//! Configuration and report structures used by the application.

pub mod report;
pub mod settings;

pub use report::*;
pub use settings::*;
