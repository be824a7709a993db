//! Names and locations of the cached incident documents.

use std::fmt;
use std::path::{Path, PathBuf};

/// One of the two documents produced by every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// The fetched document, unmodified.
    All,
    /// The active-incident subset.
    Active,
}

impl ArtifactKind {
    /// File name used both locally and as the last key segment.
    pub const fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::All => "incidents_all.geojson",
            ArtifactKind::Active => "incidents_active.geojson",
        }
    }

    /// Local cache path.
    /// Format: {output_dir}/{file_name}
    pub fn local_path(self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.file_name())
    }

    /// Object key.
    /// Format: {prefix}/{file_name}, or just {file_name} for an empty prefix
    pub fn remote_key(self, prefix: &str) -> String {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            self.file_name().to_string()
        } else {
            format!("{}/{}", prefix, self.file_name())
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::All => write!(f, "all"),
            ArtifactKind::Active => write!(f, "active"),
        }
    }
}
