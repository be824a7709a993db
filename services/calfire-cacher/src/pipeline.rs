//! Fetch, persist, publish, filter, persist, publish.
//!
//! A run walks a fixed sequence of stages:
//!
//! ```text
//! Start -> Fetched -> AllWritten -> AllPublished -> Filtered
//!       -> ActiveWritten -> ActivePublished -> Done
//! ```
//!
//! Each stage starts only after the previous one succeeded. The first error
//! aborts the run; whatever earlier stages wrote stays in place and nothing
//! is retried. Retrying is the scheduler's job (re-run the whole binary).

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, instrument};

use incident_common::{feature_count, filter_active, ArtifactKind, CacherError, CacherResult};
use storage::{write_atomic, ObjectStorage, Publisher};

use crate::config::CacherConfig;
use crate::fetch::{HttpFetcher, SourceFetcher};

/// Last stage a run completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    Start,
    Fetched,
    AllWritten,
    AllPublished,
    Filtered,
    ActiveWritten,
    ActivePublished,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Start => "start",
            PipelineStage::Fetched => "fetched",
            PipelineStage::AllWritten => "all_written",
            PipelineStage::AllPublished => "all_published",
            PipelineStage::Filtered => "filtered",
            PipelineStage::ActiveWritten => "active_written",
            PipelineStage::ActivePublished => "active_published",
            PipelineStage::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed run: the error plus the last stage that completed before it.
#[derive(Debug, Error)]
#[error("CalFire cacher job failed after stage '{stage}': {error}")]
pub struct PipelineFailure {
    pub stage: PipelineStage,
    #[source]
    pub error: CacherError,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    /// Features in the fetched document, if it had a `features` array
    pub total_features: Option<usize>,
    pub active_features: usize,
    pub all_key: String,
    pub active_key: String,
}

/// One cacher run over injected fetch and publish backends.
pub struct Pipeline<'a> {
    config: &'a CacherConfig,
    fetcher: &'a dyn SourceFetcher,
    publisher: &'a dyn Publisher,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a CacherConfig,
        fetcher: &'a dyn SourceFetcher,
        publisher: &'a dyn Publisher,
    ) -> Self {
        Self {
            config,
            fetcher,
            publisher,
        }
    }

    /// Execute every stage in order, stopping at the first failure.
    #[instrument(skip(self), fields(bucket = %self.publisher.bucket()))]
    pub async fn run(&self) -> Result<RunSummary, PipelineFailure> {
        let mut stage = PipelineStage::Start;

        let result = self.execute(&mut stage).await;
        result.map_err(|error| report_failure(stage, error))
    }

    async fn execute(&self, stage: &mut PipelineStage) -> CacherResult<RunSummary> {
        let started_at = Utc::now();
        let clock = Instant::now();
        info!(utc = %started_at.to_rfc3339(), "Starting CalFire cacher job");

        let all = self.fetcher.fetch(self.config.source_url()).await?;
        *stage = PipelineStage::Fetched;

        let all_key = self.store(ArtifactKind::All, &all, stage).await?;

        let active = filter_active(&all);
        *stage = PipelineStage::Filtered;

        let active_key = self.store(ArtifactKind::Active, &active, stage).await?;
        *stage = PipelineStage::Done;

        let summary = RunSummary {
            started_at,
            elapsed: clock.elapsed(),
            total_features: feature_count(&all),
            active_features: active.len(),
            all_key,
            active_key,
        };

        let elapsed_ms = summary.elapsed.as_millis() as u64;
        info!(
            total = ?summary.total_features,
            active = summary.active_features,
            elapsed_ms,
            "CalFire cacher job completed successfully"
        );

        Ok(summary)
    }

    /// Persist then publish one artifact, advancing `stage` after each step.
    async fn store<T>(
        &self,
        kind: ArtifactKind,
        document: &T,
        stage: &mut PipelineStage,
    ) -> CacherResult<String>
    where
        T: serde::Serialize + ?Sized + Sync,
    {
        let (written, published) = match kind {
            ArtifactKind::All => (PipelineStage::AllWritten, PipelineStage::AllPublished),
            ArtifactKind::Active => (PipelineStage::ActiveWritten, PipelineStage::ActivePublished),
        };

        let path = self.config.local_path(kind);
        let key = self.config.remote_key(kind);

        write_atomic(&path, document).map_err(|e| log_stage_error(kind, e))?;
        *stage = written;

        self.publisher
            .publish(&path, &key)
            .await
            .map_err(|e| log_stage_error(kind, e))?;
        *stage = published;

        Ok(key)
    }
}

/// Build the HTTP and S3 clients for `config`, then run one job.
///
/// Client construction failures are reported like any other failed run,
/// at [`PipelineStage::Start`].
pub async fn run_job(
    config: &CacherConfig,
    user_agent: &str,
) -> Result<RunSummary, PipelineFailure> {
    let fetcher = HttpFetcher::new(config.fetch_timeout, user_agent)
        .map_err(|e| report_failure(PipelineStage::Start, e))?;
    let publisher =
        ObjectStorage::new(&config.storage).map_err(|e| report_failure(PipelineStage::Start, e))?;

    Pipeline::new(config, &fetcher, &publisher).run().await
}

fn report_failure(stage: PipelineStage, error: CacherError) -> PipelineFailure {
    error!(
        stage = %stage,
        operation = error.operation(),
        error = %error,
        "CalFire cacher job failed"
    );
    PipelineFailure { stage, error }
}

fn log_stage_error(kind: ArtifactKind, err: CacherError) -> CacherError {
    error!(artifact = %kind, operation = err.operation(), error = %err, "Stage failed");
    err
}
