//! Logging setup.
//!
//! Two sinks: the console at the requested level and an append-only trace
//! file at debug level. The trace file is trimmed to its most recent lines
//! before each run so it never grows without bound.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Lines kept in the trace file between runs.
pub const MAX_LOG_LINES: usize = 10_000;

/// Result of trimming the trace file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimOutcome {
    /// No file yet.
    Missing,
    /// File was already short enough.
    Unchanged { lines: usize },
    /// File was cut down to the last `kept` lines.
    Trimmed { before: usize, kept: usize },
}

/// Keep only the last `max_lines` lines of `path`.
pub fn trim_log_file(path: &Path, max_lines: usize) -> io::Result<TrimOutcome> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(TrimOutcome::Missing),
        Err(e) => return Err(e),
    };

    let lines: Vec<&str> = content.lines().collect();
    if lines.len() <= max_lines {
        return Ok(TrimOutcome::Unchanged { lines: lines.len() });
    }

    let mut kept = lines[lines.len() - max_lines..].join("\n");
    kept.push('\n');
    fs::write(path, kept)?;

    Ok(TrimOutcome::Trimmed {
        before: lines.len(),
        kept: max_lines,
    })
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `console_level` for the console sink. The trace file
/// always records debug and above.
pub fn init(log_path: &Path, console_level: &str) -> Result<()> {
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(console_level)?,
    };

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    // Trim before opening so the appender starts from the shortened file.
    let trimmed = trim_log_file(log_path, MAX_LOG_LINES);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let console_layer = fmt::layer().with_target(true).with_filter(console_filter);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    match trimmed {
        Ok(TrimOutcome::Trimmed { before, kept }) => {
            debug!(path = %log_path.display(), before, kept, "Trimmed log file")
        }
        Ok(_) => {}
        Err(e) => warn!(path = %log_path.display(), error = %e, "Failed to trim log file"),
    }
    debug!(path = %log_path.display(), "Logging initialized");

    Ok(())
}

/// Console filter for a plain level name (`error` .. `trace`, or `off`).
pub fn level_filter(level: &str) -> Result<EnvFilter> {
    let level: LevelFilter = level.trim().parse().map_err(|_| {
        anyhow::anyhow!(
            "Invalid log level '{}': expected one of off, error, warn, info, debug, trace",
            level
        )
    })?;
    Ok(EnvFilter::default().add_directive(level.into()))
}
