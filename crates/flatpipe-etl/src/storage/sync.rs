//! Best-effort bulk sync between local directories and the bucket
//!
//! Sync is non-transactional by contract: each file or object is
//! transferred independently, failures are recorded in the returned
//! [`SyncReport`] instead of aborting the loop, and a partial failure
//! leaves mixed local/remote state with no cleanup.

use crate::error::Result;
use crate::storage::Storage;
use std::path::Path;
use tracing::{debug, info, warn};

/// Outcome of one transferred item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Uploaded { key: String, bytes: u64 },
    Downloaded { key: String, bytes: u64 },
    Failed { key: String, reason: String },
}

impl SyncOutcome {
    pub fn key(&self) -> &str {
        match self {
            SyncOutcome::Uploaded { key, .. }
            | SyncOutcome::Downloaded { key, .. }
            | SyncOutcome::Failed { key, .. } => key,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. })
    }
}

/// Ordered per-item outcomes of one sync operation
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    pub fn push(&mut self, outcome: SyncOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[SyncOutcome] {
        &self.outcomes
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failure()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Keys with path separators would escape the destination directory, so
/// the download loop refuses them.
fn is_nested_key(key: &str) -> bool {
    key.contains('/') || key.contains('\\')
}

impl Storage {
    /// Upload every regular file directly inside `source_dir` under a key
    /// equal to its file name.
    ///
    /// Directories and files that fail to transfer are skipped; the loop
    /// always visits every entry. Returns the per-file outcomes.
    pub async fn upload_dir(&self, source_dir: &Path) -> Result<SyncReport> {
        info!(
            "Uploading files from {} to bucket {}",
            source_dir.display(),
            self.bucket()
        );

        let mut paths: Vec<_> = std::fs::read_dir(source_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        paths.sort();

        let mut report = SyncReport::default();

        for path in paths {
            if !path.is_file() {
                debug!("Skipping non-file entry: {}", path.display());
                continue;
            }

            let key = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => {
                    warn!("Skipping file with non-UTF-8 name: {}", path.display());
                    continue;
                },
            };

            match self.upload_file(&path, &key).await {
                Ok(result) => {
                    report.push(SyncOutcome::Uploaded {
                        key,
                        bytes: result.size as u64,
                    });
                },
                Err(e) => {
                    warn!("Upload failed for {}: {}", key, e);
                    report.push(SyncOutcome::Failed {
                        key,
                        reason: e.to_string(),
                    });
                },
            }
        }

        info!(
            "Upload sync finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );

        Ok(report)
    }

    /// Download every object in the bucket into `dest_dir`, one local
    /// file per key.
    ///
    /// An empty bucket is logged and produces an empty report. Objects
    /// that fail to transfer are recorded and the loop continues.
    pub async fn download_all(&self, dest_dir: &Path) -> Result<SyncReport> {
        let keys = self.list("").await?;

        if keys.is_empty() {
            info!("No objects found in bucket {}", self.bucket());
            return Ok(SyncReport::default());
        }

        std::fs::create_dir_all(dest_dir)?;

        let mut report = SyncReport::default();

        for key in keys {
            if is_nested_key(&key) {
                warn!("Refusing to download nested key: {}", key);
                report.push(SyncOutcome::Failed {
                    key,
                    reason: "key contains a path separator".to_string(),
                });
                continue;
            }

            let local_path = dest_dir.join(&key);
            let result = match self.download(&key).await {
                Ok(data) => std::fs::write(&local_path, &data)
                    .map(|_| data.len() as u64)
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };

            match result {
                Ok(bytes) => {
                    info!("Downloaded: {} to {}", key, local_path.display());
                    report.push(SyncOutcome::Downloaded { key, bytes });
                },
                Err(reason) => {
                    warn!("Download failed for {}: {}", key, reason);
                    report.push(SyncOutcome::Failed { key, reason });
                },
            }
        }

        info!(
            "Download sync finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );

        Ok(report)
    }
}
