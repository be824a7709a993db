//! Common types and utilities shared by the incident cacher crates.

pub mod artifact;
pub mod error;
pub mod filter;
pub mod geojson;

pub use artifact::ArtifactKind;
pub use error::{CacherError, CacherResult, FetchError};
pub use filter::{evaluate_feature, filter_active, FeatureSkip};
pub use geojson::{feature_count, FeatureCollection, FEATURE_COLLECTION_TYPE};
