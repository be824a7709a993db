//! CalFire incident cacher library.
//!
//! Fetches the CalFire incident GeoJSON, caches the full and active-only
//! documents locally, and publishes both to S3. The binary in `main.rs`
//! wires configuration and logging around [`pipeline::Pipeline`].

pub mod config;
pub mod fetch;
pub mod logging;
pub mod pipeline;

pub use config::CacherConfig;
pub use fetch::{HttpFetcher, SourceFetcher};
pub use pipeline::{run_job, Pipeline, PipelineFailure, PipelineStage, RunSummary};
