//! Exploratory tools: dataset overview and descriptive statistics.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use dataplan_core::stats::{present, NumericSummary};
use dataplan_core::tool_trait::{str_arg, str_list_arg};
use dataplan_core::{AnalysisContext, AnalysisTool, ArgMap, CoreError, CoreResult, ToolOutput};

use super::{sorted_groups, values_at};

/// High-level overview of the dataset structure and missing values.
pub struct EdaOverviewTool;

#[async_trait]
impl AnalysisTool for EdaOverviewTool {
    fn name(&self) -> &str {
        "eda_overview"
    }

    fn description(&self) -> &str {
        "Row/column counts, column names and missing values per column"
    }

    async fn execute(&self, ctx: &AnalysisContext, _args: &ArgMap) -> CoreResult<ToolOutput> {
        let ds = ctx.dataset();
        let missing: Map<String, Value> = ds
            .columns()
            .iter()
            .map(|c| (c.name.clone(), json!(c.num_missing())))
            .collect();

        Ok(ToolOutput::preview(json!({
            "num_rows": ds.num_rows(),
            "num_columns": ds.num_columns(),
            "columns": ds.column_names(),
            "missing": missing,
        })))
    }
}

/// Descriptive statistics for numeric columns, optionally grouped by one
/// column. Ungrouped output has one record per column; grouped output has
/// one record per group with `<column>_<stat>` fields.
pub struct SummaryStatsTool;

#[async_trait]
impl AnalysisTool for SummaryStatsTool {
    fn name(&self) -> &str {
        "summary_stats"
    }

    fn description(&self) -> &str {
        "Descriptive statistics of numeric columns, optionally grouped"
    }

    async fn execute(&self, ctx: &AnalysisContext, args: &ArgMap) -> CoreResult<ToolOutput> {
        let ds = ctx.dataset();
        let columns = str_list_arg(args, "columns").unwrap_or_default();
        if columns.is_empty() {
            return Err(CoreError::tool("summary_stats requires at least one column"));
        }

        // Resolve every column up front so the error names the first bad one
        let series = columns
            .iter()
            .map(|name| ds.numeric(name).map(|values| (name.as_str(), values)))
            .collect::<CoreResult<Vec<_>>>()?;

        let records: Vec<Value> = match str_arg(args, "by") {
            None => series
                .iter()
                .map(|(name, values)| {
                    let mut record = Map::new();
                    record.insert("column".to_string(), json!(name));
                    extend_summary(&mut record, "", &NumericSummary::from_values(&present(values)));
                    Value::Object(record)
                })
                .collect(),
            Some(by) => {
                let group_col = ds.require_column(by)?;
                sorted_groups(group_col, ds.num_rows())
                    .into_iter()
                    .map(|(label, rows)| {
                        let mut record = Map::new();
                        record.insert(by.to_string(), json!(label));
                        for (name, values) in &series {
                            let summary = NumericSummary::from_values(&values_at(values, &rows));
                            extend_summary(&mut record, &format!("{}_", name), &summary);
                        }
                        Value::Object(record)
                    })
                    .collect()
            }
        };

        Ok(ToolOutput::preview(Value::Array(records)))
    }
}

fn extend_summary(record: &mut Map<String, Value>, prefix: &str, summary: &NumericSummary) {
    for (field, value) in summary.fields() {
        let value = match (field, value) {
            ("count", _) => json!(summary.count),
            (_, v) => json!(v),
        };
        record.insert(format!("{}{}", prefix, field), value);
    }
}
