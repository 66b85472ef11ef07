//! Dataset Loading
//!
//! Reads tabular files from disk into a `Dataset`.

pub mod loader;

pub use loader::{load_dataset, parse_csv, DatasetFormat};
