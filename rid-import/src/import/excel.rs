//! Load the first worksheet of an Excel file into a tabular structure

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, Xlsx, open_workbook};
use serde_json::{Map, Value};
use std::path::Path;

/// A single worksheet as headers plus rows of JSON values
///
/// Cells are kept positionally; [`SheetTable::record`] zips a row with the
/// headers into a column-name map for per-row processing.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl SheetTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a header, if present
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// One row as a column-name -> value map; columns with empty headers
    /// are dropped, cells past the header row are ignored
    pub fn record(&self, row_idx: usize) -> Map<String, Value> {
        let mut record = Map::new();
        let Some(row) = self.rows.get(row_idx) else {
            return record;
        };
        for (col_idx, header) in self.headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = row.get(col_idx).cloned().unwrap_or(Value::Null);
            record.insert(header.clone(), value);
        }
        record
    }
}

/// Convert an Excel cell to a JSON value
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => {
            // Whole numbers come back as floats; issue ids and codes want ints
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                Value::from(*f as i64)
            } else {
                Value::from(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::String(format!("{}", dt)),
        Data::DateTimeIso(s) => Value::String(s.clone()),
        Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(_) => Value::Null,
    }
}

/// Load the first worksheet of an Excel file
///
/// The first row is taken as the header row. Rows with no non-null cell
/// are dropped.
pub fn load_first_sheet<P: AsRef<Path>>(path: P) -> Result<SheetTable> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let sheet_name = match workbook.sheet_names().first() {
        Some(name) => name.clone(),
        None => bail!("No worksheets in {}", path.display()),
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet '{}'", sheet_name))?;

    let mut raw_rows = range.rows();
    let headers: Vec<String> = match raw_rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| match cell {
                Data::String(s) => s.trim().to_string(),
                _ => String::new(),
            })
            .collect(),
        None => bail!("Sheet '{}' has no header row", sheet_name),
    };

    let rows: Vec<Vec<Value>> = raw_rows
        .map(|row| row.iter().map(cell_to_value).collect::<Vec<Value>>())
        .filter(|row| row.iter().any(|cell| !cell.is_null()))
        .collect();

    Ok(SheetTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_to_value_conversions() {
        assert_eq!(cell_to_value(&Data::Empty), Value::Null);
        assert_eq!(cell_to_value(&Data::String("  ".to_string())), Value::Null);
        assert_eq!(
            cell_to_value(&Data::String("RID-1".to_string())),
            json!("RID-1")
        );
        assert_eq!(cell_to_value(&Data::Float(42.0)), json!(42));
        assert_eq!(cell_to_value(&Data::Float(1.5)), json!(1.5));
        assert_eq!(cell_to_value(&Data::Bool(true)), json!(true));
    }

    #[test]
    fn test_record_zips_headers_and_cells() {
        let table = SheetTable::new(
            vec!["Project".to_string(), String::new(), "Subject".to_string()],
            vec![vec![json!("Alpha"), json!("ignored"), json!("A subject")]],
        );

        let record = table.record(0);
        assert_eq!(record.get("Project"), Some(&json!("Alpha")));
        assert_eq!(record.get("Subject"), Some(&json!("A subject")));
        // Empty header column is dropped entirely
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_record_pads_short_rows_with_null() {
        let table = SheetTable::new(
            vec!["Project".to_string(), "Subject".to_string()],
            vec![vec![json!("Alpha")]],
        );
        let record = table.record(0);
        assert_eq!(record.get("Subject"), Some(&Value::Null));
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(load_first_sheet("/nonexistent/rids.xlsx").is_err());
    }
}
