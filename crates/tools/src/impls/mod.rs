//! Built-in Tool Implementations
//!
//! - `eda` - dataset overview and descriptive statistics
//! - `plotting` - histogram and boxplot PNG artifacts
//! - `stats` - two-sample t-test

mod eda;
mod plotting;
mod stats;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use dataplan_core::{AnalysisContext, Column, CoreResult};

use crate::trait_def::ToolRegistry;

pub use eda::{EdaOverviewTool, SummaryStatsTool};
pub use plotting::{BoxplotTool, HistogramTool};
pub use stats::TTestTool;

/// Register every built-in tool.
pub fn register_builtin_tools(registry: &mut ToolRegistry) {
    registry.register(Arc::new(EdaOverviewTool));
    registry.register(Arc::new(SummaryStatsTool));
    registry.register(Arc::new(BoxplotTool));
    registry.register(Arc::new(HistogramTool));
    registry.register(Arc::new(TTestTool));
}

/// Reserve a fresh artifact path `<artifacts_dir>/<prefix>_<8 hex>.<ext>`,
/// creating the directory if needed.
pub(crate) fn artifact_path(ctx: &AnalysisContext, prefix: &str, ext: &str) -> CoreResult<PathBuf> {
    let dir = ctx.artifacts_dir();
    std::fs::create_dir_all(dir)?;
    let id = uuid::Uuid::new_v4().simple().to_string();
    Ok(dir.join(format!("{}_{}.{}", prefix, &id[..8], ext)))
}

/// Row indices per distinct label of `col`, in order of first appearance.
/// Rows with a missing label are dropped.
pub(crate) fn group_rows(col: &Column, num_rows: usize) -> Vec<(String, Vec<usize>)> {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in 0..num_rows {
        let Some(label) = col.label(row) else {
            continue;
        };
        match index.get(&label) {
            Some(&i) => groups[i].1.push(row),
            None => {
                index.insert(label.clone(), groups.len());
                groups.push((label, vec![row]));
            }
        }
    }
    groups
}

/// `group_rows`, sorted by label (numerically for numeric columns).
pub(crate) fn sorted_groups(col: &Column, num_rows: usize) -> Vec<(String, Vec<usize>)> {
    let mut groups = group_rows(col, num_rows);
    if col.is_numeric() {
        groups.sort_by(|a, b| {
            let x = a.1.first().and_then(|&r| numeric_at(col, r));
            let y = b.1.first().and_then(|&r| numeric_at(col, r));
            x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal)
        });
    } else {
        groups.sort_by(|a, b| a.0.cmp(&b.0));
    }
    groups
}

fn numeric_at(col: &Column, row: usize) -> Option<f64> {
    match &col.data {
        dataplan_core::ColumnData::Numeric(v) => v.get(row).copied().flatten(),
        dataplan_core::ColumnData::Text(_) => None,
    }
}

/// Present values of `values` at `rows`.
pub(crate) fn values_at(values: &[Option<f64>], rows: &[usize]) -> Vec<f64> {
    rows.iter()
        .filter_map(|&r| values.get(r).copied().flatten())
        .filter(|x| x.is_finite())
        .collect()
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::sync::Arc;

    use dataplan_core::{AnalysisContext, ArgMap, Column, Dataset};
    use serde_json::Value;

    /// Ten-row dataset with numeric `age`/`income` and a two-level `gender`.
    pub fn sample_context(artifacts: &std::path::Path) -> AnalysisContext {
        let ages = [23.0, 35.0, 31.0, 47.0, 52.0, 29.0, 41.0, 38.0, 26.0, 60.0];
        let incomes = [31.0, 48.0, 45.0, 70.0, 81.0, 39.0, 55.0, 52.0, 34.0, 90.0];
        let genders = ["f", "m", "f", "m", "f", "m", "f", "m", "f", "m"];
        let ds = Dataset::new(vec![
            Column::numeric("age", ages.iter().map(|&x| Some(x)).collect()),
            Column::numeric("income", incomes.iter().map(|&x| Some(x)).collect()),
            Column::text("gender", genders.iter().map(|s| Some(s.to_string())).collect()),
            Column::text(
                "region",
                ["n", "s", "e", "n", "s", "e", "n", "s", "e", "w"]
                    .iter()
                    .map(|s| Some(s.to_string()))
                    .collect(),
            ),
        ])
        .unwrap();
        AnalysisContext::new("test-run", Arc::new(ds), artifacts)
    }

    pub fn args(v: Value) -> ArgMap {
        v.as_object().cloned().unwrap()
    }
}
