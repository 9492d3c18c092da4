//! Error types for the ETL pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, EtlError>;

/// Error type for pipeline operations.
///
/// Failures fall into two tiers: data-shape errors (a file that does not
/// parse, a cell that will not coerce) abort the run, while transport
/// errors against the object store or the database are surfaced per
/// operation and handled by the caller's policy.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Data shape error: {0}")]
    DataShape(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EtlError {
    /// True for fatal data-shape failures, as opposed to transport
    /// failures that a caller may treat as transient
    pub fn is_data_shape(&self) -> bool {
        matches!(
            self,
            EtlError::Csv(_) | EtlError::Json(_) | EtlError::Xml(_) | EtlError::DataShape(_)
        )
    }
}

impl From<flatpipe_common::FlatpipeError> for EtlError {
    fn from(err: flatpipe_common::FlatpipeError) -> Self {
        match err {
            flatpipe_common::FlatpipeError::Io(e) => EtlError::Io(e),
            flatpipe_common::FlatpipeError::Serialization(e) => EtlError::Json(e),
            flatpipe_common::FlatpipeError::DataShape(msg) => EtlError::DataShape(msg),
            flatpipe_common::FlatpipeError::Config(msg) => EtlError::Config(msg),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_data_shape_classification() {
        assert!(EtlError::DataShape("bad cell".to_string()).is_data_shape());
        assert!(!EtlError::Storage("timeout".to_string()).is_data_shape());
        assert!(!EtlError::Config("empty bucket".to_string()).is_data_shape());
    }
}
