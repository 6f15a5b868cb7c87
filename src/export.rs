//! Workbook export
//!
//! Renders the full row set of every entity table into one xlsx
//! workbook: one sheet per table, named after the table, header row in
//! column declaration order, one row per stored record.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use rusqlite::types::Value;

use crate::storage::{Database, Entity};
use crate::Result;

/// Export all entity tables to an xlsx workbook at `output`.
/// Returns the output path.
pub fn export_workbook(db: &Database, output: &Path) -> Result<PathBuf> {
    let mut workbook = Workbook::new();

    for entity in Entity::ALL {
        let table = db.fetch_table(entity)?;
        let sheet = workbook.add_worksheet();
        sheet.set_name(entity.table_name())?;

        for (col, name) in table.columns.iter().enumerate() {
            sheet.write_string(0, col as u16, name.as_str())?;
        }
        for (r, row) in table.rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let (row_idx, col_idx) = ((r + 1) as u32, c as u16);
                match value {
                    Value::Null => {}
                    Value::Integer(i) => {
                        sheet.write_number(row_idx, col_idx, *i as f64)?;
                    }
                    Value::Real(f) => {
                        sheet.write_number(row_idx, col_idx, *f)?;
                    }
                    Value::Text(s) => {
                        sheet.write_string(row_idx, col_idx, s.as_str())?;
                    }
                    Value::Blob(_) => {}
                }
            }
        }
    }

    workbook.save(output)?;
    tracing::info!("exported workbook to {}", output.display());
    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_writes_workbook() {
        let db = Database::open_in_memory().unwrap();
        db.create_schema().unwrap();
        let dut_id = db.insert_dut("W001", "DOE1", 1, "C1", "D001").unwrap();
        let session_id = db
            .insert_session(dut_id, "20260202", None, Some("T&P"), None, None)
            .unwrap();
        db.insert_experimental_conditions(session_id, &[("temperature", (25.0, "C").into())])
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("export.xlsx");
        let written = export_workbook(&db, &output).unwrap();

        assert_eq!(written, output);
        let size = std::fs::metadata(&output).unwrap().len();
        assert!(size > 0);
    }
}
