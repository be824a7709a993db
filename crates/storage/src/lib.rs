//! Storage for cached incident documents.
//!
//! Provides:
//! - Atomic local persistence of JSON documents
//! - Object storage (S3 or S3-compatible) publishing of cached files

pub mod local;
pub mod object_store;

pub use self::object_store::{ObjectStorage, ObjectStorageConfig, Publisher};
pub use local::write_atomic;
