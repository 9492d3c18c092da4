//! Common types used across Flatpipe

use crate::error::{FlatpipeError, Result};
use serde_json::Value;

/// An ordered tabular record set: named columns plus rows of cells.
///
/// Cells are `serde_json::Value`s so every extractor feeds the same
/// representation; `Value::Null` encodes an absent cell. The schema is
/// explicit and may grow: appending a record or another record set with
/// unseen columns extends the column list, and rows that predate a column
/// hold `Null` in it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RecordSet {
    /// Create an empty record set with no columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record set with a known schema
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Column names, in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the record set holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of a column, adding it (and padding existing rows with
    /// `Null`) when it does not exist yet
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Value::Null);
        }
        self.columns.len() - 1
    }

    /// Append one positional row. The row must match the current schema
    /// width exactly.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(FlatpipeError::DataShape(format!(
                "row has {} cells but the schema has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append one named record. Unknown column names extend the schema;
    /// columns the record does not mention are `Null` in the new row.
    pub fn push_record(&mut self, record: Vec<(String, Value)>) {
        let mut row = vec![Value::Null; self.columns.len()];
        for (name, value) in record {
            let index = self.ensure_column(&name);
            if index >= row.len() {
                row.resize(index + 1, Value::Null);
            }
            row[index] = value;
        }
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Concatenate another record set onto this one.
    ///
    /// The combined schema is this set's columns followed by the other
    /// set's unseen columns in first-appearance order; rows are padded
    /// with `Null` for columns they lack. Rows keep their relative order.
    pub fn append(&mut self, other: RecordSet) {
        let mapping: Vec<usize> = other
            .columns
            .iter()
            .map(|name| self.ensure_column(name))
            .collect();
        let width = self.columns.len();
        for row in other.rows {
            let mut aligned = vec![Value::Null; width];
            for (value, &target) in row.into_iter().zip(&mapping) {
                aligned[target] = value;
            }
            self.rows.push(aligned);
        }
    }

    /// All values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Add or overwrite a full column. The value count must match the
    /// row count.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(FlatpipeError::DataShape(format!(
                "column {} has {} values but the record set has {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }
        let index = self.ensure_column(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[index] = value;
        }
        Ok(())
    }

    /// Cell accessor by row index and column name
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let index = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[index])
    }

    /// Iterate rows as positional slices aligned to [`columns`](Self::columns)
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(|row| row.as_slice())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_push_record_grows_schema() {
        let mut records = RecordSet::new();
        records.push_record(record(&[("a", json!(1))]));
        records.push_record(record(&[("a", json!(2)), ("b", json!("x"))]));

        assert_eq!(records.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(records.len(), 2);
        // first row predates column b
        assert_eq!(records.get(0, "b"), Some(&Value::Null));
        assert_eq!(records.get(1, "b"), Some(&json!("x")));
    }

    #[test]
    fn test_append_identical_schemas() {
        let mut left = RecordSet::with_columns(vec!["a".to_string(), "b".to_string()]);
        left.push_row(vec![json!(1), json!(2)]).unwrap();
        let mut right = RecordSet::with_columns(vec!["a".to_string(), "b".to_string()]);
        right.push_row(vec![json!(3), json!(4)]).unwrap();
        right.push_row(vec![json!(5), json!(6)]).unwrap();

        left.append(right);

        assert_eq!(left.len(), 3);
        assert_eq!(left.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(left.get(2, "b"), Some(&json!(6)));
    }

    #[test]
    fn test_append_aligns_differing_schemas() {
        let mut left = RecordSet::with_columns(vec!["a".to_string()]);
        left.push_row(vec![json!(1)]).unwrap();
        let mut right = RecordSet::with_columns(vec!["b".to_string(), "a".to_string()]);
        right.push_row(vec![json!("x"), json!(2)]).unwrap();

        left.append(right);

        assert_eq!(left.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(left.get(0, "b"), Some(&Value::Null));
        assert_eq!(left.get(1, "a"), Some(&json!(2)));
        assert_eq!(left.get(1, "b"), Some(&json!("x")));
    }

    #[test]
    fn test_append_empty_set_with_columns_unions_schema() {
        let mut left = RecordSet::with_columns(vec!["a".to_string()]);
        left.push_row(vec![json!(1)]).unwrap();
        let right = RecordSet::with_columns(vec!["b".to_string()]);

        left.append(right);

        assert_eq!(left.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(left.len(), 1);
    }

    #[test]
    fn test_push_row_rejects_width_mismatch() {
        let mut records = RecordSet::with_columns(vec!["a".to_string(), "b".to_string()]);
        let err = records.push_row(vec![json!(1)]).unwrap_err();
        assert!(matches!(err, FlatpipeError::DataShape(_)));
    }

    #[test]
    fn test_set_column_overwrites_in_place() {
        let mut records = RecordSet::with_columns(vec!["a".to_string()]);
        records.push_row(vec![json!(1)]).unwrap();
        records.push_row(vec![json!(2)]).unwrap();

        records
            .set_column("double", vec![json!(2.0), json!(4.0)])
            .unwrap();
        assert_eq!(records.column("double").unwrap(), vec![&json!(2.0), &json!(4.0)]);

        // overwriting replaces values, not columns
        records
            .set_column("double", vec![json!(20.0), json!(40.0)])
            .unwrap();
        assert_eq!(records.columns().len(), 2);
        assert_eq!(records.get(0, "double"), Some(&json!(20.0)));
    }

    #[test]
    fn test_set_column_rejects_length_mismatch() {
        let mut records = RecordSet::with_columns(vec!["a".to_string()]);
        records.push_row(vec![json!(1)]).unwrap();

        let err = records.set_column("b", vec![]).unwrap_err();
        assert!(matches!(err, FlatpipeError::DataShape(_)));
    }
}
