//! Source document retrieval.
//!
//! A single GET with a bounded timeout. Non-2xx responses, transport errors
//! and undecodable bodies all surface as [`FetchError`]s; nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, instrument};

use incident_common::{feature_count, CacherError, CacherResult, FetchError};

/// Retrieves the upstream incident document.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> CacherResult<Value>;
}

/// HTTP implementation backed by `reqwest`.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration, user_agent: &str) -> CacherResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| CacherError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Network(Box::new(err))
        }
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> CacherResult<Value> {
        let fetch_error = |source: FetchError| CacherError::Fetch {
            url: url.to_string(),
            source,
        };

        info!("Fetching CalFire GeoJSON");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(self.classify(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(FetchError::Status(status.as_u16())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(self.classify(e)))?;

        let document: Value =
            serde_json::from_slice(&body).map_err(|e| fetch_error(FetchError::Decode(e)))?;

        info!(
            bytes = body.len(),
            features = ?feature_count(&document),
            "Successfully fetched CalFire GeoJSON"
        );

        Ok(document)
    }
}
