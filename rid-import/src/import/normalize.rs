//! Column normalization applied to every loaded sheet before row processing
//!
//! Review sheets come in with an "Id" column that the tracker knows as
//! "Code", blank cells where the pipeline wants explicit nulls, and the
//! occasional mathematical-italic glyph pasted in from a PDF. All of that
//! is fixed here, once, so the validator and mapper see clean input.
//! The whole pass is idempotent.

use serde_json::Value;

use super::excel::SheetTable;
use super::row::{COL_CODE, COL_ID, COL_PROBLEM_LOCATION, COL_RECOMMENDED_SOLUTION};

/// U+1D453 MATHEMATICAL ITALIC SMALL F, seen in pasted "Recommended
/// Solution" text; confusable with ASCII "f"
const ITALIC_F: char = '\u{1D453}';

/// Normalize a sheet in place
pub fn normalize_columns(table: &mut SheetTable) {
    rename_id_to_code(table);
    blank_cells_to_null(table);
    default_to_dash(table, COL_RECOMMENDED_SOLUTION);
    default_to_dash(table, COL_PROBLEM_LOCATION);
    fix_confusable_glyphs(table, COL_RECOMMENDED_SOLUTION);
}

/// Rename an "Id" column to "Code", dropping any pre-existing "Code"
/// column first so the rename cannot produce a duplicate header
fn rename_id_to_code(table: &mut SheetTable) {
    if table.column(COL_ID).is_none() {
        return;
    }
    if let Some(code_idx) = table.column(COL_CODE) {
        remove_column(table, code_idx);
    }
    // Re-resolve: the index may have shifted if the dropped column sat
    // before "Id"
    if let Some(id_idx) = table.column(COL_ID) {
        table.headers[id_idx] = COL_CODE.to_string();
    }
}

fn remove_column(table: &mut SheetTable, idx: usize) {
    table.headers.remove(idx);
    for row in &mut table.rows {
        if idx < row.len() {
            row.remove(idx);
        }
    }
}

/// Trim string cells and turn whitespace-only cells into explicit nulls
fn blank_cells_to_null(table: &mut SheetTable) {
    for row in &mut table.rows {
        for cell in row.iter_mut() {
            if let Value::String(s) = cell {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    *cell = Value::Null;
                } else if trimmed.len() != s.len() {
                    *cell = Value::String(trimmed.to_string());
                }
            }
        }
    }
}

/// Fill null cells of a column with the literal "-"
fn default_to_dash(table: &mut SheetTable, column: &str) {
    let Some(idx) = table.column(column) else {
        return;
    };
    for row in &mut table.rows {
        if let Some(cell) = row.get_mut(idx) {
            if cell.is_null() {
                *cell = Value::String("-".to_string());
            }
        }
    }
}

fn fix_confusable_glyphs(table: &mut SheetTable, column: &str) {
    let Some(idx) = table.column(column) else {
        return;
    };
    for row in &mut table.rows {
        if let Some(Value::String(s)) = row.get_mut(idx) {
            if s.contains(ITALIC_F) {
                *s = s.replace(ITALIC_F, "f");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(headers: &[&str], rows: Vec<Vec<Value>>) -> SheetTable {
        SheetTable::new(headers.iter().map(|h| h.to_string()).collect(), rows)
    }

    #[test]
    fn test_id_renamed_to_code_dropping_existing_code() {
        let mut t = table(
            &["Code", "Id", "Subject"],
            vec![vec![json!("stale"), json!("RID-7"), json!("s")]],
        );
        normalize_columns(&mut t);

        assert_eq!(t.headers, vec!["Code", "Subject"]);
        assert_eq!(t.rows[0], vec![json!("RID-7"), json!("s")]);
    }

    #[test]
    fn test_no_rename_without_id_column() {
        let mut t = table(&["Code", "Subject"], vec![vec![json!("RID-7"), json!("s")]]);
        normalize_columns(&mut t);
        assert_eq!(t.headers, vec!["Code", "Subject"]);
        assert_eq!(t.rows[0][0], json!("RID-7"));
    }

    #[test]
    fn test_blank_cells_become_null_and_defaults_apply() {
        let mut t = table(
            &["Subject", "Recommended Solution", "Problem Location"],
            vec![vec![json!("   "), Value::Null, json!("")]],
        );
        normalize_columns(&mut t);

        assert_eq!(t.rows[0][0], Value::Null);
        assert_eq!(t.rows[0][1], json!("-"));
        assert_eq!(t.rows[0][2], json!("-"));
    }

    #[test]
    fn test_italic_f_replaced_in_recommended_solution_only() {
        let mut t = table(
            &["Recommended Solution", "Description"],
            vec![vec![json!("apply \u{1D453}ix"), json!("\u{1D453} stays")]],
        );
        normalize_columns(&mut t);

        assert_eq!(t.rows[0][0], json!("apply fix"));
        assert_eq!(t.rows[0][1], json!("\u{1D453} stays"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut once = table(
            &["Code", "Id", "Recommended Solution", "Problem Location"],
            vec![
                vec![json!("old"), json!(12), json!(" trim me "), Value::Null],
                vec![json!("old2"), json!(13), Value::Null, json!("loc")],
            ],
        );
        normalize_columns(&mut once);

        let mut twice = once.clone();
        normalize_columns(&mut twice);

        assert_eq!(once, twice);
    }
}
