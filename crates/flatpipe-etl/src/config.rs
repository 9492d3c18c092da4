//! Configuration management

use crate::error::{EtlError, Result};
use crate::storage::config::StorageConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Pipeline Configuration Constants
// ============================================================================

/// Default directory holding the source files to sync up.
pub const DEFAULT_SOURCE_DIR: &str = "./source";

/// Default working directory the bucket is downloaded into.
pub const DEFAULT_WORK_DIR: &str = "./work";

/// Default name of the transformed output file.
pub const DEFAULT_OUTPUT_FILE: &str = "transformed_data.csv";

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/flatpipe";

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory whose files are uploaded by `sync-up`
    pub source_dir: PathBuf,

    /// Directory the bucket is downloaded into and extracted from
    pub work_dir: PathBuf,

    /// Path the transformed CSV is written to
    pub output_file: PathBuf,

    /// Database connection URL
    pub database_url: String,

    /// Object storage settings
    pub storage: StorageConfig,
}

impl PipelineConfig {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = PipelineConfig {
            source_dir: std::env::var("FLATPIPE_SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SOURCE_DIR)),
            work_dir: std::env::var("FLATPIPE_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_WORK_DIR)),
            output_file: std::env::var("FLATPIPE_OUTPUT_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_FILE)),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            storage: StorageConfig::from_env(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.bucket.is_empty() {
            return Err(EtlError::Config("Bucket name cannot be empty".to_string()));
        }

        if self.database_url.is_empty() {
            return Err(EtlError::Config("Database URL cannot be empty".to_string()));
        }

        if self.output_file.as_os_str().is_empty() {
            return Err(EtlError::Config("Output file cannot be empty".to_string()));
        }

        if self.output_file.file_name().is_none() {
            return Err(EtlError::Config(format!(
                "Output file {} has no file name",
                self.output_file.display()
            )));
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            storage: StorageConfig::default(),
        }
    }
}
