//! Delimited (CSV) extraction

use crate::error::Result;
use csv::Reader;
use flatpipe_common::types::RecordSet;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Parse a CSV file into a record set: first row is the header, every
/// cell is kept verbatim as a string.
pub fn extract_csv(path: &Path) -> Result<RecordSet> {
    debug!("Extracting: {}", path.display());

    let mut reader = Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut records = RecordSet::with_columns(headers);
    for row in reader.records() {
        let row = row?;
        records.push_row(
            row.iter()
                .map(|cell| Value::String(cell.to_string()))
                .collect(),
        )?;
    }

    Ok(records)
}
