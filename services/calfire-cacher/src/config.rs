//! Cacher configuration.
//!
//! Built once in `main` from CLI flags (with environment fallbacks) and
//! passed by reference to everything else.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::Serialize;

use incident_common::{ArtifactKind, CacherError, CacherResult};
use storage::ObjectStorageConfig;

pub const DEFAULT_SOURCE_URL: &str =
    "https://incidents.fire.ca.gov/umbraco/api/IncidentApi/GeoJsonList?inactive=true";
pub const DEFAULT_BUCKET: &str = "airfire-data-exports";
pub const DEFAULT_PREFIX: &str = "calfire";
pub const DEFAULT_PROCESS_NAME: &str = "calfire_cacher";
pub const DEFAULT_OUTPUT_DIR: &str = "/home/ubuntu/data/calfire";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Top-level cacher configuration.
#[derive(Debug, Clone, Serialize)]
pub struct CacherConfig {
    /// GeoJSON source URL
    pub source_url: String,

    /// Upper bound on the whole fetch (connect, headers and body)
    pub fetch_timeout: Duration,

    /// Destination bucket, region and endpoint
    pub storage: ObjectStorageConfig,

    /// Key prefix inside the bucket, without leading or trailing slashes
    pub prefix: String,

    /// Local cache directory; also holds the trace log
    pub output_dir: PathBuf,

    /// Name used for the log file and the HTTP user agent
    pub process_name: String,
}

impl Default for CacherConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            storage: ObjectStorageConfig {
                bucket: DEFAULT_BUCKET.to_string(),
                region: None,
                endpoint: None,
            },
            prefix: DEFAULT_PREFIX.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            process_name: DEFAULT_PROCESS_NAME.to_string(),
        }
    }
}

impl CacherConfig {
    /// Check the configuration before any I/O happens.
    pub fn validate(&self) -> CacherResult<()> {
        let url = Url::parse(&self.source_url).map_err(|e| {
            CacherError::Config(format!("source URL '{}' is invalid: {}", self.source_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CacherError::Config(format!(
                "source URL '{}' must use http or https",
                self.source_url
            )));
        }

        if self.storage.bucket.trim().is_empty() {
            return Err(CacherError::Config("bucket must not be empty".to_string()));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(CacherError::Config(
                "output directory must not be empty".to_string(),
            ));
        }

        if self.process_name.trim().is_empty() || self.process_name.contains('/') {
            return Err(CacherError::Config(format!(
                "process name '{}' must be a non-empty file name",
                self.process_name
            )));
        }

        if self.fetch_timeout.is_zero() {
            return Err(CacherError::Config(
                "fetch timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Local cache path for an artifact.
    pub fn local_path(&self, kind: ArtifactKind) -> PathBuf {
        kind.local_path(&self.output_dir)
    }

    /// Object key for an artifact.
    pub fn remote_key(&self, kind: ArtifactKind) -> String {
        kind.remote_key(&self.prefix)
    }

    /// Trace log location.
    /// Format: {output_dir}/{process_name}_TRACE.log
    pub fn log_path(&self) -> PathBuf {
        trace_log_path(&self.output_dir, &self.process_name)
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn bucket(&self) -> &str {
        &self.storage.bucket
    }
}

/// Strip leading and trailing slashes from a key prefix.
pub fn normalize_prefix(prefix: &str) -> String {
    prefix.trim().trim_matches('/').to_string()
}

pub fn trace_log_path(output_dir: &Path, process_name: &str) -> PathBuf {
    output_dir.join(format!("{}_TRACE.log", process_name))
}
