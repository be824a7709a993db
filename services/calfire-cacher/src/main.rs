//! CalFire incident cacher.
//!
//! One run per invocation:
//! - Fetch the CalFire incident GeoJSON
//! - Cache the full document and the active-only subset locally
//! - Upload both to S3
//!
//! Meant to be re-run by an external scheduler (cron, systemd timer).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, warn};

use calfire_cacher::config::{
    normalize_prefix, CacherConfig, DEFAULT_BUCKET, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_OUTPUT_DIR,
    DEFAULT_PREFIX, DEFAULT_PROCESS_NAME, DEFAULT_SOURCE_URL,
};
use calfire_cacher::{logging, run_job};
use storage::ObjectStorageConfig;

#[derive(Parser, Debug)]
#[command(name = "calfire-cacher")]
#[command(about = "Fetch CalFire GeoJSON, cache locally, and upload full/active subsets to S3")]
struct Args {
    /// CalFire GeoJSON source URL
    #[arg(long, env = "CALFIRE_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    source_url: String,

    /// Destination S3 bucket
    #[arg(long, env = "S3_BUCKET", default_value = DEFAULT_BUCKET)]
    bucket: String,

    /// Destination S3 key prefix
    #[arg(long, env = "S3_PREFIX", default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// AWS region for the S3 client
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// S3-compatible endpoint (e.g. http://minio:9000)
    #[arg(long, env = "S3_ENDPOINT")]
    endpoint: Option<String>,

    /// Process name for logging
    #[arg(long, env = "PROCESS_NAME", default_value = DEFAULT_PROCESS_NAME)]
    process_name: String,

    /// Local directory for cached GeoJSON and logs
    #[arg(long, env = "OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Timeout for the source request, in seconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    fetch_timeout_secs: u64,

    /// Console log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn to_config(&self) -> CacherConfig {
        CacherConfig {
            source_url: self.source_url.clone(),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            storage: ObjectStorageConfig {
                bucket: self.bucket.trim().to_string(),
                region: self.region.clone().filter(|r| !r.is_empty()),
                endpoint: self.endpoint.clone().filter(|e| !e.is_empty()),
            },
            prefix: normalize_prefix(&self.prefix),
            output_dir: self.output_dir.clone(),
            process_name: self.process_name.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = args.to_config();
    config.validate()?;

    logging::init(&config.log_path(), &args.log_level)?;

    info!(
        process = %config.process_name,
        bucket = config.bucket(),
        prefix = %config.prefix,
        "Logging initialized"
    );
    match serde_json::to_string(&config) {
        Ok(rendered) => debug!(config = %rendered, "Configuration"),
        Err(e) => warn!(error = %e, "Failed to render configuration"),
    }

    let user_agent = format!("{}/{}", config.process_name, env!("CARGO_PKG_VERSION"));
    run_job(&config, &user_agent).await?;

    Ok(())
}
