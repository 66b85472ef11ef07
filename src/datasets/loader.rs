//! File Loaders
//!
//! Supported formats, picked by file extension:
//! - `.csv` - comma separated, double-quote escaping, first row is the header
//! - `.json` - array of flat records
//! - `.xlsx` / `.xls` / `.ods` - first worksheet via calamine

use std::path::Path;

use calamine::Reader;
use serde_json::Value;

use dataplan_core::Dataset;

use crate::utils::error::{AppError, AppResult};

/// Maximum dataset file size (200 MB)
const MAX_DATASET_SIZE: u64 = 200 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Json,
    Spreadsheet,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "xlsx" | "xls" | "xlsm" | "ods" => Ok(Self::Spreadsheet),
            other => Err(AppError::dataset(format!(
                "Unsupported dataset format '{}' for {}",
                other,
                path.display()
            ))),
        }
    }
}

/// Load a dataset from `path`.
pub fn load_dataset(path: &Path) -> AppResult<Dataset> {
    let format = DatasetFormat::from_path(path)?;
    check_file_size(path)?;

    let (header, rows) = match format {
        DatasetFormat::Csv => parse_csv(&std::fs::read_to_string(path)?)?,
        DatasetFormat::Json => parse_json_records(&std::fs::read_to_string(path)?)?,
        DatasetFormat::Spreadsheet => read_first_sheet(path)?,
    };

    let dataset = Dataset::from_records(header, rows)?;
    tracing::info!(
        path = %path.display(),
        rows = dataset.num_rows(),
        columns = dataset.num_columns(),
        "Loaded dataset"
    );
    Ok(dataset)
}

fn check_file_size(path: &Path) -> AppResult<u64> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| AppError::dataset(format!("Cannot read {}: {}", path.display(), e)))?;
    let size = metadata.len();
    if size > MAX_DATASET_SIZE {
        return Err(AppError::dataset(format!(
            "File too large: {:.1} MB (max {:.1} MB)",
            size as f64 / (1024.0 * 1024.0),
            MAX_DATASET_SIZE as f64 / (1024.0 * 1024.0)
        )));
    }
    Ok(size)
}

/// Split CSV text into a header and rows.
///
/// Fields may be wrapped in double quotes; inside quotes, commas and line
/// breaks are literal and `""` is an escaped quote. Blank lines are skipped.
pub fn parse_csv(text: &str) -> AppResult<(Vec<String>, Vec<Vec<String>>)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            other => field.push(other),
        }
    }
    if in_quotes {
        return Err(AppError::dataset("Unterminated quoted field in CSV"));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }

    let mut records = records.into_iter();
    let header = records
        .next()
        .ok_or_else(|| AppError::dataset("CSV file is empty"))?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    Ok((header, records.collect()))
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.len() == 1 && record[0].trim().is_empty();
    if !blank {
        records.push(record);
    }
}

/// Flatten a JSON array of objects. Columns appear in first-seen key order.
fn parse_json_records(text: &str) -> AppResult<(Vec<String>, Vec<Vec<String>>)> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(AppError::dataset("JSON dataset must be an array of records"));
    };

    let mut header: Vec<String> = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| AppError::dataset(format!("Record {} is not an object", idx + 1)))?;
        for key in obj.keys() {
            if !header.contains(key) {
                header.push(key.clone());
            }
        }
    }

    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| {
            header
                .iter()
                .map(|key| match obj.get(key) {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                })
                .collect()
        })
        .collect();
    Ok((header, rows))
}

fn read_first_sheet(path: &Path) -> AppResult<(Vec<String>, Vec<Vec<String>>)> {
    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| AppError::dataset(format!("Failed to open spreadsheet: {}", e)))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::dataset("Spreadsheet has no sheets"))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| AppError::dataset(format!("Failed to read sheet '{}': {}", sheet, e)))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<String>>());
    let header = rows
        .next()
        .ok_or_else(|| AppError::dataset(format!("Sheet '{}' is empty", sheet)))?;
    Ok((header, rows.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataplan_core::ColumnData;

    #[test]
    fn test_parse_csv_quotes_and_newlines() {
        let text = "name,note,age\n\"Smith, J\",\"said \"\"hi\"\"\",41\r\nLee,\"two\nlines\",\n\n";
        let (header, rows) = parse_csv(text).unwrap();
        assert_eq!(header, vec!["name", "note", "age"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["Smith, J", "said \"hi\"", "41"]);
        assert_eq!(rows[1], vec!["Lee", "two\nlines", ""]);
    }

    #[test]
    fn test_parse_csv_errors() {
        assert!(parse_csv("").is_err());
        assert!(parse_csv("a,b\n\"open,1\n").is_err());
    }

    #[test]
    fn test_load_csv_infers_types() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("people.csv");
        std::fs::write(&path, "age,gender\n31,f\n,m\n45.5,f\n").unwrap();

        let ds = load_dataset(&path).unwrap();
        assert_eq!(ds.num_rows(), 3);
        let age = ds.column("age").unwrap();
        assert_eq!(age.data, ColumnData::Numeric(vec![Some(31.0), None, Some(45.5)]));
        assert!(!ds.column("gender").unwrap().is_numeric());
    }

    #[test]
    fn test_load_json_records() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("people.json");
        std::fs::write(
            &path,
            r#"[{"age": 31, "gender": "f"}, {"gender": "m", "score": 2.5}, {"age": null}]"#,
        )
        .unwrap();

        let ds = load_dataset(&path).unwrap();
        assert_eq!(ds.column_names(), vec!["age", "gender", "score"]);
        assert_eq!(ds.num_rows(), 3);
        assert_eq!(ds.column("age").unwrap().num_missing(), 2);
        assert!(ds.column("score").unwrap().is_numeric());
    }

    #[test]
    fn test_load_json_rejects_non_array() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, r#"{"age": 1}"#).unwrap();
        assert!(matches!(load_dataset(&path), Err(AppError::Dataset(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = DatasetFormat::from_path(Path::new("data.parquet")).unwrap_err();
        assert!(err.to_string().contains("parquet"));
        assert_eq!(
            DatasetFormat::from_path(Path::new("Data.XLSX")).unwrap(),
            DatasetFormat::Spreadsheet
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_dataset(Path::new("/nonexistent/data.csv")).unwrap_err();
        assert!(matches!(err, AppError::Dataset(_)));
    }
}
