//! Object storage client
//!
//! Thin wrapper over the S3 SDK. Primitive operations live here; the
//! best-effort directory/bucket sync built on top of them is in
//! [`sync`].

use crate::error::{EtlError, Result};
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};
use std::path::Path;
use tracing::{debug, info, instrument};

pub mod config;
pub mod sync;

pub use sync::{SyncOutcome, SyncReport};

/// Key prefix the transformed output file is uploaded under.
pub const PROCESSED_PREFIX: &str = "processed-data";

#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    pub fn new(config: config::StorageConfig) -> Self {
        debug!("Initializing storage with config: {:?}", config);

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "flatpipe-storage",
        );

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(s3_config_builder.build());

        info!("Storage client initialized for bucket: {}", config.bucket);

        Self {
            client,
            bucket: config.bucket,
        }
    }

    /// Bucket this client operates on
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    #[instrument(skip(self, data))]
    pub async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<UploadResult> {
        let checksum = calculate_sha256(&data);
        let size = data.len() as i64;

        debug!("Uploading {} bytes to s3://{}/{}", size, self.bucket, key);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request.send().await.map_err(|e| {
            EtlError::Storage(format!(
                "Failed to upload s3://{}/{}: {}",
                self.bucket, key, e
            ))
        })?;

        info!("Uploaded: {} to {}/{}", key, self.bucket, key);

        Ok(UploadResult {
            key: key.to_string(),
            checksum,
            size,
        })
    }

    /// Upload a local file under the given key
    #[instrument(skip(self))]
    pub async fn upload_file(&self, path: &Path, key: &str) -> Result<UploadResult> {
        let data = std::fs::read(path)?;
        self.upload(key, data, content_type_for(path)).await
    }

    #[instrument(skip(self))]
    pub async fn download(&self, key: &str) -> Result<Vec<u8>> {
        debug!("Downloading from s3://{}/{}", self.bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                EtlError::Storage(format!(
                    "Failed to download s3://{}/{}: {}",
                    self.bucket, key, e
                ))
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| {
                EtlError::Storage(format!("Failed to read body of s3://{}/{}: {}", self.bucket, key, e))
            })?
            .into_bytes()
            .to_vec();

        debug!(
            "Downloaded {} bytes from s3://{}/{}",
            data.len(),
            self.bucket,
            key
        );

        Ok(data)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        debug!("Listing objects in s3://{}/{}", self.bucket, prefix);

        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .send()
            .await
            .map_err(|e| {
                EtlError::Storage(format!("Failed to list s3://{}: {}", self.bucket, e))
            })?;

        let keys = response
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(|k| k.to_string()))
            .collect();

        Ok(keys)
    }

    /// Key the transformed output file is stored under
    pub fn processed_key(&self, file_name: &str) -> String {
        format!("{}/{}", PROCESSED_PREFIX, file_name)
    }
}

#[derive(Debug, Clone)]
pub struct UploadResult {
    pub key: String,
    pub checksum: String,
    pub size: i64,
}

fn calculate_sha256(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn content_type_for(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some("text/csv".to_string()),
        "json" => Some("application/json".to_string()),
        "xml" => Some("application/xml".to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn test_storage() -> Storage {
        Storage {
            client: Client::from_conf(aws_sdk_s3::Config::builder().build()),
            bucket: "test-bucket".to_string(),
        }
    }

    #[test]
    fn test_processed_key() {
        let storage = test_storage();
        assert_eq!(
            storage.processed_key("transformed_data.csv"),
            "processed-data/transformed_data.csv"
        );
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(
            content_type_for(Path::new("a.CSV")),
            Some("text/csv".to_string())
        );
        assert_eq!(
            content_type_for(Path::new("a.json")),
            Some("application/json".to_string())
        );
        assert_eq!(content_type_for(Path::new("a.parquet")), None);
        assert_eq!(content_type_for(Path::new("noext")), None);
    }

    #[test]
    fn test_calculate_sha256() {
        let checksum = calculate_sha256(b"Hello, World!");
        assert_eq!(
            checksum,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }
}
