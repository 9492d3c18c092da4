//! Structured record (JSON) extraction

use crate::error::{EtlError, Result};
use flatpipe_common::types::RecordSet;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Parse a JSON file into a record set.
///
/// The file is first read as a single JSON value: an array yields one
/// row per element, a single object yields one row. When that parse
/// fails the file is retried as line-delimited JSON, one object per
/// non-blank line. Elements that are not objects are data-shape errors.
pub fn extract_json(path: &Path) -> Result<RecordSet> {
    debug!("Extracting: {}", path.display());
    let content = std::fs::read_to_string(path)?;

    match serde_json::from_str::<Value>(&content) {
        Ok(value) => records_from_value(value, path),
        // not one JSON value; retry as one value per line
        Err(_) => records_from_lines(&content, path),
    }
}

fn records_from_value(value: Value, path: &Path) -> Result<RecordSet> {
    let mut records = RecordSet::new();
    match value {
        Value::Array(items) => {
            for (index, item) in items.into_iter().enumerate() {
                push_object(&mut records, item, path, index)?;
            }
        },
        single => push_object(&mut records, single, path, 0)?,
    }
    Ok(records)
}

fn records_from_lines(content: &str, path: &Path) -> Result<RecordSet> {
    let mut records = RecordSet::new();
    for (index, line) in content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
    {
        let value: Value = serde_json::from_str(line)?;
        push_object(&mut records, value, path, index)?;
    }
    Ok(records)
}

fn push_object(records: &mut RecordSet, value: Value, path: &Path, index: usize) -> Result<()> {
    match value {
        Value::Object(map) => {
            records.push_record(map.into_iter().collect());
            Ok(())
        },
        other => Err(EtlError::DataShape(format!(
            "record {} in {} is not a JSON object: {}",
            index,
            path.display(),
            other
        ))),
    }
}
