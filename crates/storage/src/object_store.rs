//! Object storage publishing for cached documents (S3 compatible).

use std::path::Path as LocalPath;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore, RetryConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use incident_common::{CacherError, CacherResult};

/// Configuration for object storage connection.
///
/// Credentials are never part of this struct; they come from the standard
/// AWS environment variables, config files or instance profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    /// Bucket name
    pub bucket: String,
    /// AWS region; falls back to the environment when unset
    pub region: Option<String>,
    /// S3-compatible endpoint URL (e.g. MinIO); AWS when unset
    pub endpoint: Option<String>,
}

impl ObjectStorageConfig {
    /// Plain HTTP is only allowed for explicit `http://` endpoints.
    pub fn allow_http(&self) -> bool {
        self.endpoint
            .as_deref()
            .is_some_and(|endpoint| endpoint.starts_with("http://"))
    }
}

/// Uploads local files to a fixed bucket.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Bucket every key is written to.
    fn bucket(&self) -> &str;

    /// Upload the current contents of `local_path` to `key`, replacing any
    /// existing object. One attempt; no read-back.
    async fn publish(&self, local_path: &LocalPath, key: &str) -> CacherResult<()>;
}

/// Object storage client for cached incident documents.
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectStorage {
    /// Create a new S3 client from config.
    pub fn new(config: &ObjectStorageConfig) -> CacherResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&config.bucket)
            .with_retry(single_attempt());

        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if config.allow_http() {
            builder = builder.with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| CacherError::Config(format!("Failed to create S3 client: {}", e)))?;

        info!(bucket = %config.bucket, "Created S3 client");

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
        })
    }

    /// Wrap an existing store, e.g. `object_store::memory::InMemory`.
    pub fn with_store(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Write bytes to a key in the bucket.
    #[instrument(skip(self, data), fields(bucket = %self.bucket, key = %key))]
    pub async fn put(&self, key: &str, data: Bytes) -> CacherResult<()> {
        let location = Path::from(key);
        debug!(size = data.len(), "Writing object");

        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| self.publish_error(key, e.to_string()))?;

        Ok(())
    }

    fn publish_error(&self, key: &str, message: String) -> CacherError {
        CacherError::Publish {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            message,
        }
    }
}

#[async_trait]
impl Publisher for ObjectStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn publish(&self, local_path: &LocalPath, key: &str) -> CacherResult<()> {
        info!(
            path = %local_path.display(),
            "Uploading to s3://{}/{}",
            self.bucket,
            key
        );

        let data = tokio::fs::read(local_path).await.map_err(|e| {
            self.publish_error(
                key,
                format!("Failed to read {}: {}", local_path.display(), e),
            )
        })?;

        self.put(key, Bytes::from(data)).await?;

        info!("Upload complete: s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

/// The pipeline never retries; a failed upload fails the run.
fn single_attempt() -> RetryConfig {
    RetryConfig {
        max_retries: 0,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use test_utils::temp_test_dir;

    fn memory_storage() -> (Arc<InMemory>, ObjectStorage) {
        let memory = Arc::new(InMemory::new());
        let storage = ObjectStorage::with_store(memory.clone(), "test-bucket");
        (memory, storage)
    }

    async fn read_object(store: &InMemory, key: &str) -> Bytes {
        store
            .get(&Path::from(key))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap()
    }

    #[test]
    fn test_create_s3_client() {
        let config = ObjectStorageConfig {
            bucket: "airfire-data-exports".to_string(),
            region: Some("us-west-2".to_string()),
            endpoint: None,
        };
        assert!(ObjectStorage::new(&config).is_ok());
    }

    #[test]
    fn test_allow_http_only_for_http_endpoints() {
        let mut config = ObjectStorageConfig {
            bucket: "b".to_string(),
            ..Default::default()
        };
        assert!(!config.allow_http());

        config.endpoint = Some("https://s3.us-west-2.amazonaws.com".to_string());
        assert!(!config.allow_http());

        config.endpoint = Some("http://minio:9000".to_string());
        assert!(config.allow_http());
    }

    #[tokio::test]
    async fn test_publish_uploads_file_contents() {
        let (memory, storage) = memory_storage();
        let dir = temp_test_dir();
        let path = dir.path().join("incidents_all.geojson");
        std::fs::write(&path, b"{\"type\": \"FeatureCollection\"}").unwrap();

        storage
            .publish(&path, "calfire/incidents_all.geojson")
            .await
            .unwrap();

        let stored = read_object(&memory, "calfire/incidents_all.geojson").await;
        assert_eq!(&stored[..], b"{\"type\": \"FeatureCollection\"}");
        assert_eq!(storage.bucket(), "test-bucket");
    }

    #[tokio::test]
    async fn test_publish_overwrites_existing_object() {
        let (memory, storage) = memory_storage();
        let dir = temp_test_dir();
        let path = dir.path().join("incidents_active.geojson");

        std::fs::write(&path, "old").unwrap();
        storage.publish(&path, "calfire/incidents_active.geojson").await.unwrap();
        std::fs::write(&path, "new").unwrap();
        storage.publish(&path, "calfire/incidents_active.geojson").await.unwrap();

        let stored = read_object(&memory, "calfire/incidents_active.geojson").await;
        assert_eq!(&stored[..], b"new");
    }

    #[tokio::test]
    async fn test_publish_missing_file_names_key() {
        let (memory, storage) = memory_storage();
        let dir = temp_test_dir();
        let path = dir.path().join("missing.geojson");

        let err = storage
            .publish(&path, "calfire/incidents_all.geojson")
            .await
            .unwrap_err();

        match err {
            CacherError::Publish { bucket, key, .. } => {
                assert_eq!(bucket, "test-bucket");
                assert_eq!(key, "calfire/incidents_all.geojson");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(memory
            .head(&Path::from("calfire/incidents_all.geojson"))
            .await
            .is_err());
    }
}
