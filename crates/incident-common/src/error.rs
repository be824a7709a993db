//! Error types for the incident cacher.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using CacherError.
pub type CacherResult<T> = Result<T, CacherError>;

/// Primary error type for cacher operations.
///
/// Every variant is fatal to a run. Filter anomalies never surface here;
/// see [`crate::filter::FeatureSkip`].
#[derive(Debug, Error)]
pub enum CacherError {
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to upload {key} to s3://{bucket}: {message}")]
    Publish {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CacherError {
    /// Short name of the operation that failed, used in log summaries.
    pub fn operation(&self) -> &'static str {
        match self {
            CacherError::Fetch { .. } => "fetch",
            CacherError::Persist { .. } => "persist",
            CacherError::Publish { .. } => "publish",
            CacherError::Config(_) => "config",
        }
    }
}

/// Why retrieving the source document failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_identify_target() {
        let err = CacherError::Publish {
            bucket: "airfire-data-exports".to_string(),
            key: "calfire/incidents_all.geojson".to_string(),
            message: "access denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to upload calfire/incidents_all.geojson to s3://airfire-data-exports: access denied"
        );
        assert_eq!(err.operation(), "publish");

        let err = CacherError::Persist {
            path: PathBuf::from("/data/calfire/incidents_all.geojson"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err
            .to_string()
            .starts_with("Failed to write /data/calfire/incidents_all.geojson"));
    }

    #[test]
    fn test_fetch_error_keeps_cause() {
        use std::error::Error as _;

        let err = CacherError::Fetch {
            url: "https://example.com/incidents".to_string(),
            source: FetchError::Status(503),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch https://example.com/incidents: HTTP error: 503"
        );
        assert!(err.source().is_some());
    }
}
