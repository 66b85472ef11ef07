//! Plan Logging
//!
//! Per-run debug artifacts of the planning pipeline. The pipeline writes
//! through the `PlanSink` trait; sinks never fail the run.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

/// Destination for planning artifacts (`prompt`, `raw`, `clean`, `dedup`,
/// `parse_warn`, `parse_error`).
pub trait PlanSink: Send + Sync {
    /// Record a text artifact.
    fn text(&self, name: &str, content: &str);

    /// Record a JSON artifact.
    fn json(&self, name: &str, value: &Value);
}

/// Writes `<root>/plan_<run_id>/<name>.txt|.json`.
///
/// The directory is created on first write. Write failures are logged and
/// swallowed.
#[derive(Debug, Clone)]
pub struct PlanLogger {
    dir: PathBuf,
}

impl PlanLogger {
    pub fn new(root: impl AsRef<Path>, run_id: &str) -> Self {
        let id: String = run_id.chars().filter(|c| *c != '-').collect();
        Self {
            dir: root.as_ref().join(format!("plan_{}", id)),
        }
    }

    /// Directory this logger writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, stem: &str, ext: &str, payload: &str) {
        let path = self.dir.join(format!("{}.{}", stem, ext));
        let result = std::fs::create_dir_all(&self.dir).and_then(|_| std::fs::write(&path, payload));
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write plan log");
        }
    }
}

impl PlanSink for PlanLogger {
    fn text(&self, name: &str, content: &str) {
        self.write(name, "txt", content);
    }

    fn json(&self, name: &str, value: &Value) {
        match serde_json::to_string_pretty(value) {
            Ok(payload) => self.write(name, "json", &payload),
            Err(e) => tracing::warn!(artifact = name, error = %e, "Failed to serialize plan log"),
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PlanSink for NullSink {
    fn text(&self, _name: &str, _content: &str) {}

    fn json(&self, _name: &str, _value: &Value) {}
}

/// Keeps artifacts in memory, in write order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the recorded artifacts, in write order.
    pub fn names(&self) -> Vec<String> {
        self.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Content of the last artifact called `name`. JSON artifacts are
    /// stored pretty-printed.
    pub fn get(&self, name: &str) -> Option<String> {
        self.lock()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, content)| content.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, String)>> {
        // A poisoned lock still holds valid entries
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, name: &str, content: String) {
        self.lock().push((name.to_string(), content));
    }
}

impl PlanSink for MemorySink {
    fn text(&self, name: &str, content: &str) {
        self.push(name, content.to_string());
    }

    fn json(&self, name: &str, value: &Value) {
        self.push(
            name,
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        );
    }
}
