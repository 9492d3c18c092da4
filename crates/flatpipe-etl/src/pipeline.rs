//! Pipeline orchestration
//!
//! The flow is strictly linear: download the bucket, extract every
//! supported file, convert units, write the output CSV, upload it under
//! the processed prefix, then append to the database. Sync steps are
//! best-effort per item, extraction and transformation fail fast, and
//! the database phase is contained: its errors are logged without
//! failing the run.

use crate::config::PipelineConfig;
use crate::db;
use crate::error::{EtlError, Result};
use crate::extract::extract_dir;
use crate::load::write_csv;
use crate::storage::{Storage, SyncReport};
use crate::transform::convert_units;
use flatpipe_common::types::RecordSet;
use tracing::{error, info};

pub struct Pipeline {
    config: PipelineConfig,
    storage: Storage,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let storage = Storage::new(config.storage.clone());
        Self { config, storage }
    }

    /// Upload every file in the source directory to the bucket
    pub async fn sync_up(&self) -> Result<SyncReport> {
        self.storage.upload_dir(&self.config.source_dir).await
    }

    /// Download every object in the bucket into the working directory
    pub async fn sync_down(&self) -> Result<SyncReport> {
        self.storage.download_all(&self.config.work_dir).await
    }

    /// Run the full pipeline
    pub async fn run(&self) -> Result<PipelineStats> {
        info!("Starting pipeline run");

        // 1. Download the bucket into the working directory
        let report = self.sync_down().await?;

        // 2. Extract and concatenate every supported file
        let records = extract_dir(&self.config.work_dir)?;

        // 3. Unit conversions
        let records = convert_units(records)?;

        // 4. Serialize the output artifact
        let output = write_csv(&records, &self.config.output_file)?;

        // 5. Upload the artifact under the processed prefix
        let file_name = output.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
            EtlError::Config(format!("Output path {} has no file name", output.display()))
        })?;
        let key = self.storage.processed_key(file_name);
        let uploaded = self.storage.upload_file(&output, &key).await?;
        info!(
            "File uploaded to s3://{}/{}",
            self.storage.bucket(),
            uploaded.key
        );

        // 6. Database phase: failures are logged, the run still succeeds
        let rows_appended = match self.append_to_database(&records).await {
            Ok(count) => Some(count),
            Err(e) => {
                error!("Database phase failed: {}", e);
                None
            },
        };

        let stats = PipelineStats {
            files_downloaded: report.succeeded(),
            download_failures: report.failed(),
            rows_extracted: records.len(),
            rows_appended,
        };

        info!("Pipeline run completed: {:?}", stats);
        Ok(stats)
    }

    async fn append_to_database(&self, records: &RecordSet) -> Result<u64> {
        let pool = db::connect(&self.config.database_url).await?;
        db::ensure_persons_table(&pool).await?;
        let appended = db::append_persons(&pool, records).await?;
        pool.close().await;
        Ok(appended)
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub files_downloaded: usize,
    pub download_failures: usize,
    pub rows_extracted: usize,
    /// Rows appended to the persons table, `None` when the database
    /// phase failed
    pub rows_appended: Option<u64>,
}
