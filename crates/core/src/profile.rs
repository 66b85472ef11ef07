//! Dataset Profile
//!
//! The statistical summary of a dataset that is embedded in the planning
//! prompt. Numeric columns carry moments, text columns their most frequent
//! values.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::dataset::{ColumnData, Dataset};
use crate::stats;

/// Number of most frequent values kept for text columns.
const TOP_VALUES: usize = 5;

/// Per-column profile entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub dtype: String,
    pub num_missing: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_values: Option<BTreeMap<String, usize>>,
}

/// Profile of a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub num_rows: usize,
    pub num_columns: usize,
    pub columns: BTreeMap<String, ColumnProfile>,
}

impl DatasetProfile {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let columns = dataset
            .columns()
            .iter()
            .map(|col| {
                let mut profile = ColumnProfile {
                    dtype: col.dtype().to_string(),
                    num_missing: col.num_missing(),
                    mean: None,
                    std: None,
                    min: None,
                    max: None,
                    top_values: None,
                };
                match &col.data {
                    ColumnData::Numeric(values) => {
                        let present = stats::present(values);
                        profile.mean = stats::mean(&present);
                        profile.std = stats::std_dev(&present);
                        profile.min = present.iter().copied().reduce(f64::min);
                        profile.max = present.iter().copied().reduce(f64::max);
                    }
                    ColumnData::Text(values) => {
                        profile.top_values = Some(top_values(values));
                    }
                }
                (col.name.clone(), profile)
            })
            .collect();

        Self {
            num_rows: dataset.num_rows(),
            num_columns: dataset.num_columns(),
            columns,
        }
    }

    /// Pretty JSON rendering for prompts.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn top_values(values: &[Option<String>]) -> BTreeMap<String, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values.iter().flatten() {
        *counts.entry(v.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    // Highest count first, ties by value for determinism
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(TOP_VALUES)
        .map(|(k, n)| (k.to_string(), n))
        .collect()
}
