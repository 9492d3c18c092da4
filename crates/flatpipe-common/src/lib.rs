//! Flatpipe Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the Flatpipe workspace.
//!
//! # Overview
//!
//! This crate provides the pieces every Flatpipe component relies on:
//!
//! - **Error Handling**: the shared error type for tabular operations
//! - **Logging**: tracing subscriber setup with console and file output
//! - **Types**: the [`RecordSet`](types::RecordSet) tabular data model
//!
//! # Example
//!
//! ```no_run
//! use flatpipe_common::types::RecordSet;
//! use serde_json::Value;
//!
//! let mut records = RecordSet::new();
//! records.push_record(vec![
//!     ("Name".to_string(), Value::String("Alice".to_string())),
//! ]);
//! assert_eq!(records.len(), 1);
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{FlatpipeError, Result};
pub use types::RecordSet;
