//! Flatpipe ETL Library
//!
//! A linear ETL pipeline for flat files: sync CSV/JSON/XML files
//! through an object-store bucket, extract them into one tabular
//! record set, derive metric unit columns, write the result back as
//! CSV, and append it to a relational table.
//!
//! # Example
//!
//! ```no_run
//! use flatpipe_etl::config::PipelineConfig;
//! use flatpipe_etl::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PipelineConfig::load()?;
//!     let stats = Pipeline::new(config).run().await?;
//!     println!("extracted {} rows", stats.rows_extracted);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod storage;
pub mod transform;

pub use error::{EtlError, Result};
pub use pipeline::{Pipeline, PipelineStats};
