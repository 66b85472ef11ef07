//! Tabular Dataset
//!
//! Column-oriented, read-only representation of the dataset a run analyses.
//! Each column is either numeric or text; missing cells are `None`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Values of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    /// Type name as reported in the profile.
    pub fn dtype(&self) -> &'static str {
        match self.data {
            ColumnData::Numeric(_) => "float64",
            ColumnData::Text(_) => "object",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    /// Number of missing cells.
    pub fn num_missing(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnData::Text(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    /// Text label of a cell, used for grouping. `None` for missing cells.
    ///
    /// Integral numbers render without a fractional part so that a `1.0`
    /// in a numeric group column reads as `1`.
    pub fn label(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(v) => v.get(row).copied().flatten().map(format_number),
            ColumnData::Text(v) => v.get(row).cloned().flatten(),
        }
    }
}

/// Render a float the way it is shown in group labels and previews.
pub fn format_number(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{}", x)
    }
}

/// A rectangular, column-oriented dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Dataset {
    /// Build a dataset, checking that every column has the same length and
    /// that column names are unique.
    pub fn new(columns: Vec<Column>) -> CoreResult<Self> {
        let num_rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        let mut seen = HashSet::new();
        for col in &columns {
            if col.data.len() != num_rows {
                return Err(CoreError::dataset(format!(
                    "Column '{}' has {} rows, expected {}",
                    col.name,
                    col.data.len(),
                    num_rows
                )));
            }
            if !seen.insert(col.name.as_str()) {
                return Err(CoreError::dataset(format!(
                    "Duplicate column name '{}'",
                    col.name
                )));
            }
        }
        Ok(Self { columns, num_rows })
    }

    /// Build a dataset from a header and string rows.
    ///
    /// A column is numeric iff every non-empty cell parses as `f64`; empty
    /// cells (after trimming) are missing. Short rows are padded with missing
    /// cells, long rows are an error.
    pub fn from_records(header: Vec<String>, rows: Vec<Vec<String>>) -> CoreResult<Self> {
        let width = header.len();
        for (idx, row) in rows.iter().enumerate() {
            if row.len() > width {
                return Err(CoreError::dataset(format!(
                    "Row {} has {} fields, header has {}",
                    idx + 1,
                    row.len(),
                    width
                )));
            }
        }

        let columns = header
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let cells: Vec<Option<&str>> = rows
                    .iter()
                    .map(|row| {
                        row.get(i)
                            .map(|s| s.trim())
                            .filter(|s| !s.is_empty())
                    })
                    .collect();

                let all_numeric = cells
                    .iter()
                    .flatten()
                    .all(|s| s.parse::<f64>().is_ok());

                if all_numeric {
                    Column::numeric(
                        name,
                        cells
                            .iter()
                            .map(|c| c.and_then(|s| s.parse::<f64>().ok()))
                            .collect(),
                    )
                } else {
                    Column::text(
                        name,
                        cells.iter().map(|c| c.map(str::to_string)).collect(),
                    )
                }
            })
            .collect();

        Self::new(columns)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column, failing with a message naming it.
    pub fn require_column(&self, name: &str) -> CoreResult<&Column> {
        self.column(name)
            .ok_or_else(|| CoreError::not_found(format!("Column '{}' does not exist", name)))
    }

    /// Look up a numeric column's values.
    pub fn numeric(&self, name: &str) -> CoreResult<&[Option<f64>]> {
        match &self.require_column(name)?.data {
            ColumnData::Numeric(v) => Ok(v),
            ColumnData::Text(_) => Err(CoreError::dataset(format!(
                "Column '{}' is not numeric",
                name
            ))),
        }
    }
}
