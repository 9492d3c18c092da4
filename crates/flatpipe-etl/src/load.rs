//! Load step: serialize a record set to a CSV file

use crate::error::Result;
use csv::Writer;
use flatpipe_common::types::RecordSet;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write the record set as CSV to `output_path`, header first, rows in
/// order, no index column. An existing file is overwritten. Returns the
/// path written.
pub fn write_csv(records: &RecordSet, output_path: &Path) -> Result<PathBuf> {
    info!(
        "Saving {} rows to {}",
        records.len(),
        output_path.display()
    );

    if records.columns().is_empty() {
        // nothing extracted; leave an empty file behind
        std::fs::write(output_path, b"")?;
        return Ok(output_path.to_path_buf());
    }

    let mut writer = Writer::from_path(output_path)?;
    writer.write_record(records.columns())?;
    for row in records.rows() {
        writer.write_record(row.iter().map(render_cell))?;
    }
    writer.flush()?;

    info!("Data saved as .csv file");
    Ok(output_path.to_path_buf())
}

/// Render one cell for delimited output: strings verbatim, numbers in
/// their display form, null as an empty field, nested values as compact
/// JSON.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut records = RecordSet::with_columns(vec!["Name".to_string(), "Age".to_string()]);
        records.push_row(vec![json!("Alice"), json!(30)]).unwrap();
        records
            .push_row(vec![json!("Bob"), Value::Null])
            .unwrap();

        let written = write_csv(&records, &path).unwrap();
        assert_eq!(written, path);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Name,Age\nAlice,30\nBob,\n");
    }

    #[test]
    fn test_write_csv_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale content that is much longer than the new file").unwrap();

        let mut records = RecordSet::with_columns(vec!["A".to_string()]);
        records.push_row(vec![json!(1)]).unwrap();
        write_csv(&records, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A\n1\n");
    }

    #[test]
    fn test_write_csv_empty_record_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_csv(&RecordSet::new(), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_render_cell() {
        assert_eq!(render_cell(&Value::Null), "");
        assert_eq!(render_cell(&json!("x")), "x");
        assert_eq!(render_cell(&json!(1.5)), "1.5");
        assert_eq!(render_cell(&json!(true)), "true");
        assert_eq!(render_cell(&json!({"a": 1})), "{\"a\":1}");
    }
}
