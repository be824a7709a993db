//! Shared test utilities for the calfire-cacher workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Sample incident FeatureCollections
//! - Temporary output directories
//! - Helpers for inspecting cached files
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../../crates/test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{incidents, temp_test_dir};
//! ```

pub mod fixtures;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use paths::*;

/// Macro asserting that a JSON file on disk parses to the expected value.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_json_file_eq;
///
/// assert_json_file_eq!(dir.path().join("incidents_all.geojson"), expected);
/// ```
#[macro_export]
macro_rules! assert_json_file_eq {
    ($path:expr, $expected:expr) => {{
        let owned = $path;
        let path: &std::path::Path = ::std::convert::AsRef::as_ref(&owned);
        let actual = $crate::read_json_file(path);
        assert_eq!(
            actual,
            $expected,
            "unexpected JSON content in {}",
            path.display()
        );
    }};
}
