//! Hierarchical markup (XML) extraction

use crate::error::{EtlError, Result};
use flatpipe_common::types::RecordSet;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// One record element under the root: its child tags and their text
#[derive(Debug, Default)]
struct RawRecord {
    fields: Vec<(String, String)>,
}

/// Parse an XML file into a record set.
///
/// The children of the first record element under the root name the
/// columns; every record element yields one row, aligned positionally
/// to that header. Records with fewer fields than the header are padded
/// with nulls and extra trailing fields are dropped; both cases are
/// logged with the record index.
pub fn extract_xml(path: &Path) -> Result<RecordSet> {
    debug!("Extracting: {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let raw = read_records(&content, path)?;

    let Some(first) = raw.first() else {
        return Ok(RecordSet::new());
    };

    let columns: Vec<String> = first.fields.iter().map(|(tag, _)| tag.clone()).collect();
    let mut records = RecordSet::with_columns(columns);
    let width = records.columns().len();

    for (index, record) in raw.iter().enumerate() {
        if record.fields.len() != width {
            warn!(
                "Record {} in {} has {} fields, header has {}",
                index,
                path.display(),
                record.fields.len(),
                width
            );
        }
        let mut row: Vec<Value> = record
            .fields
            .iter()
            .take(width)
            .map(|(_, text)| cell(text))
            .collect();
        row.resize(width, Value::Null);
        records.push_row(row)?;
    }

    Ok(records)
}

/// Empty elements map to null, matching the absent-cell encoding used
/// everywhere else in the pipeline.
fn cell(text: &str) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        Value::String(text.to_string())
    }
}

/// Walk the event stream collecting depth-2 elements as records and
/// their depth-3 children as fields. Anything nested deeper is ignored.
fn read_records(content: &str, path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut current: Option<RawRecord> = None;
    let mut field: Option<(String, String)> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                depth += 1;
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                match depth {
                    2 => current = Some(RawRecord::default()),
                    3 => field = Some((name, String::new())),
                    _ => {},
                }
            },
            Event::Empty(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                match depth + 1 {
                    2 => records.push(RawRecord::default()),
                    3 => {
                        if let Some(record) = current.as_mut() {
                            record.fields.push((name, String::new()));
                        }
                    },
                    _ => {},
                }
            },
            Event::Text(text) => {
                if depth == 3 {
                    if let Some((_, value)) = field.as_mut() {
                        let unescaped = text.unescape().map_err(|e| {
                            EtlError::DataShape(format!(
                                "invalid text content in {}: {}",
                                path.display(),
                                e
                            ))
                        })?;
                        value.push_str(&unescaped);
                    }
                }
            },
            Event::End(_) => {
                match depth {
                    3 => {
                        if let (Some(record), Some(done)) = (current.as_mut(), field.take()) {
                            record.fields.push(done);
                        }
                    },
                    2 => {
                        if let Some(done) = current.take() {
                            records.push(done);
                        }
                    },
                    _ => {},
                }
                depth = depth.saturating_sub(1);
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(records)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_fixture(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_extract_xml_uniform_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "people.xml",
            "<people>\
               <person><Name>Alice</Name><Age>30</Age></person>\
               <person><Name>Bob</Name><Age>25</Age></person>\
             </people>",
        );

        let records = extract_xml(&path).unwrap();

        assert_eq!(records.columns(), &["Name".to_string(), "Age".to_string()]);
        assert_eq!(records.len(), 2);
        assert_eq!(records.get(0, "Name"), Some(&json!("Alice")));
        assert_eq!(records.get(1, "Age"), Some(&json!("25")));
    }

    #[test]
    fn test_extract_xml_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "empty.xml", "<people></people>");

        let records = extract_xml(&path).unwrap();
        assert!(records.is_empty());
        assert!(records.columns().is_empty());
    }

    #[test]
    fn test_extract_xml_short_record_is_padded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "mixed.xml",
            "<people>\
               <person><Name>Alice</Name><Age>30</Age></person>\
               <person><Name>Bob</Name></person>\
             </people>",
        );

        let records = extract_xml(&path).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records.get(1, "Name"), Some(&json!("Bob")));
        assert_eq!(records.get(1, "Age"), Some(&Value::Null));
    }

    #[test]
    fn test_extract_xml_empty_element_is_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "hollow.xml",
            "<people><person><Name/><Age>30</Age></person></people>",
        );

        let records = extract_xml(&path).unwrap();
        assert_eq!(records.get(0, "Name"), Some(&Value::Null));
        assert_eq!(records.get(0, "Age"), Some(&json!("30")));
    }

    #[test]
    fn test_extract_xml_entities_are_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            "escaped.xml",
            "<rows><row><Note>fish &amp; chips</Note></row></rows>",
        );

        let records = extract_xml(&path).unwrap();
        assert_eq!(records.get(0, "Note"), Some(&json!("fish & chips")));
    }

    #[test]
    fn test_extract_xml_malformed_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "broken.xml", "<people><person></people>");

        assert!(extract_xml(&path).is_err());
    }
}
