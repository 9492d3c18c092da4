//! Unit conversion transform

use crate::error::{EtlError, Result};
use flatpipe_common::types::RecordSet;
use serde_json::Value;
use tracing::{debug, info};

/// Source and derived column names for the two conversions.
pub const HEIGHT_IN_COLUMN: &str = "Height(in)";
pub const HEIGHT_M_COLUMN: &str = "Height(m)";
pub const WEIGHT_LB_COLUMN: &str = "Weight(lb)";
pub const WEIGHT_KG_COLUMN: &str = "Weight(kg)";

const INCHES_TO_METERS: f64 = 0.0254;
const POUNDS_TO_KILOGRAMS: f64 = 0.453592;

/// Derive metric columns from the imperial ones when they are present.
///
/// `Height(in)` produces `Height(m)` and `Weight(lb)` produces
/// `Weight(kg)`; a source column that is absent is simply not
/// converted. Null source cells (rows that never had the column) stay
/// null in the derived column; every other cell must coerce to a number
/// or the run aborts with a data-shape error. Re-applying the transform
/// overwrites the derived columns with the same values.
pub fn convert_units(mut records: RecordSet) -> Result<RecordSet> {
    info!("Starting transformation");

    convert_column(
        &mut records,
        HEIGHT_IN_COLUMN,
        HEIGHT_M_COLUMN,
        INCHES_TO_METERS,
    )?;
    convert_column(
        &mut records,
        WEIGHT_LB_COLUMN,
        WEIGHT_KG_COLUMN,
        POUNDS_TO_KILOGRAMS,
    )?;

    info!("Transformation completed");
    Ok(records)
}

fn convert_column(
    records: &mut RecordSet,
    source: &str,
    target: &str,
    factor: f64,
) -> Result<()> {
    let source_values: Vec<Value> = match records.column(source) {
        Some(values) => values.into_iter().cloned().collect(),
        None => {
            debug!("Column {} absent, skipping conversion", source);
            return Ok(());
        },
    };

    let mut converted = Vec::with_capacity(source_values.len());
    for (row, value) in source_values.iter().enumerate() {
        if value.is_null() {
            converted.push(Value::Null);
            continue;
        }
        let raw = coerce_f64(value).ok_or_else(|| {
            EtlError::DataShape(format!(
                "column {} row {}: cannot convert {} to a number",
                source, row, value
            ))
        })?;
        converted.push(json_number(raw * factor)?);
    }

    records.set_column(target, converted)?;
    Ok(())
}

/// Lenient numeric coercion: numbers pass through, strings are parsed,
/// everything else (including null) is rejected.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_number(value: f64) -> Result<Value> {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| EtlError::DataShape(format!("non-finite conversion result: {}", value)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> RecordSet {
        let mut records = RecordSet::with_columns(vec![
            "Name".to_string(),
            HEIGHT_IN_COLUMN.to_string(),
            WEIGHT_LB_COLUMN.to_string(),
        ]);
        records
            .push_row(vec![json!("Alice"), json!("65"), json!("130")])
            .unwrap();
        records
            .push_row(vec![json!("Bob"), json!(70), json!(180.5)])
            .unwrap();
        records
    }

    fn as_f64(records: &RecordSet, row: usize, column: &str) -> f64 {
        coerce_f64(records.get(row, column).unwrap()).unwrap()
    }

    #[test]
    fn test_convert_units_adds_metric_columns() {
        let records = convert_units(sample()).unwrap();

        assert_eq!(records.columns().len(), 5);
        assert!((as_f64(&records, 0, HEIGHT_M_COLUMN) - 1.651).abs() < 1e-9);
        assert!((as_f64(&records, 0, WEIGHT_KG_COLUMN) - 58.96696).abs() < 1e-9);
        // numeric cells convert the same as string cells
        assert!((as_f64(&records, 1, HEIGHT_M_COLUMN) - 1.778).abs() < 1e-9);
    }

    #[test]
    fn test_convert_units_is_idempotent() {
        let once = convert_units(sample()).unwrap();
        let twice = convert_units(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_convert_units_skips_absent_columns() {
        let mut records = RecordSet::with_columns(vec!["Name".to_string()]);
        records.push_row(vec![json!("Alice")]).unwrap();

        let converted = convert_units(records).unwrap();
        assert_eq!(converted.columns(), &["Name".to_string()]);
        assert_eq!(converted.len(), 1);
    }

    #[test]
    fn test_convert_units_rejects_non_numeric_cell() {
        let mut records = RecordSet::with_columns(vec![HEIGHT_IN_COLUMN.to_string()]);
        records.push_row(vec![json!("tall")]).unwrap();

        let err = convert_units(records).unwrap_err();
        assert!(err.is_data_shape());
    }

    #[test]
    fn test_convert_units_passes_null_cells_through() {
        let mut records = RecordSet::with_columns(vec![WEIGHT_LB_COLUMN.to_string()]);
        records.push_row(vec![Value::Null]).unwrap();

        let converted = convert_units(records).unwrap();
        assert_eq!(converted.get(0, WEIGHT_KG_COLUMN), Some(&Value::Null));
    }

    #[test]
    fn test_coerce_f64() {
        assert_eq!(coerce_f64(&json!(65)), Some(65.0));
        assert_eq!(coerce_f64(&json!(" 65.5 ")), Some(65.5));
        assert_eq!(coerce_f64(&json!("abc")), None);
        assert_eq!(coerce_f64(&Value::Null), None);
        assert_eq!(coerce_f64(&json!(true)), None);
    }
}
