//! Multi-format extraction
//!
//! One extractor per supported file format, each producing a
//! [`RecordSet`], plus the directory orchestrator that dispatches by
//! file extension and concatenates the results.

use crate::error::Result;
use flatpipe_common::types::RecordSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub mod csv;
pub mod json;
pub mod xml;

pub use self::csv::extract_csv;
pub use self::json::extract_json;
pub use self::xml::extract_xml;

/// Extract every supported file directly inside `dir` into one record
/// set.
///
/// Files are visited in name order so concatenation is deterministic.
/// Unsupported extensions and subdirectories are logged and skipped;
/// an extractor failure propagates and aborts the whole run. Returns an
/// empty record set when nothing was extracted.
pub fn extract_dir(dir: &Path) -> Result<RecordSet> {
    info!("Starting extraction in {}", dir.display());

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    paths.sort();

    let mut combined = RecordSet::new();
    let mut extracted = 0usize;

    for path in paths {
        if !path.is_file() {
            debug!("Skipping non-file entry: {}", path.display());
            continue;
        }

        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);

        let records = match extension.as_deref() {
            Some("csv") => extract_csv(&path)?,
            Some("json") => extract_json(&path)?,
            Some("xml") => extract_xml(&path)?,
            _ => {
                warn!("Unsupported file type: {}", path.display());
                continue;
            },
        };

        extracted += 1;
        combined.append(records);
    }

    info!(
        "Extraction completed: {} files, {} rows, {} columns",
        extracted,
        combined.len(),
        combined.columns().len()
    );

    Ok(combined)
}
