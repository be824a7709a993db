//! Atomic JSON persistence on the local filesystem.
//!
//! Documents are written to a temporary file in the target's directory,
//! fsynced, then renamed over the target. Readers of the target path see
//! either the previous complete file or the new complete file.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use incident_common::{CacherError, CacherResult};

/// Write `document` as pretty-printed JSON to `path` atomically.
///
/// The parent directory is created if missing. On failure the temporary
/// file is removed and the existing target, if any, is left untouched.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_atomic<T>(path: &Path, document: &T) -> CacherResult<()>
where
    T: Serialize + ?Sized,
{
    let persist_error = |source: io::Error| CacherError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let directory = parent_dir(path);
    fs::create_dir_all(&directory).map_err(persist_error)?;

    debug!("Writing GeoJSON atomically");

    // Dropping the NamedTempFile on any early return deletes it.
    let mut temp = tempfile::Builder::new()
        .prefix(".incidents-")
        .suffix(".tmp")
        .tempfile_in(&directory)
        .map_err(persist_error)?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, document)
            .map_err(|e| persist_error(e.into()))?;
        writer.flush().map_err(persist_error)?;
    }
    temp.as_file().sync_all().map_err(persist_error)?;

    temp.persist(path).map_err(|e| persist_error(e.error))?;

    info!("Wrote GeoJSON");
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::{Error as _, Serializer};
    use serde_json::json;
    use test_utils::{list_file_names, missing_subdir, read_json_file, temp_test_dir};

    /// Always fails to serialize.
    struct Exploding;

    impl Serialize for Exploding {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("serialization exploded"))
        }
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = temp_test_dir();
        let path = missing_subdir(dir.path()).join("incidents_all.geojson");
        let doc = json!({"type": "FeatureCollection", "features": []});

        write_atomic(&path, &doc).unwrap();

        assert_eq!(read_json_file(&path), doc);
    }

    #[test]
    fn test_write_is_pretty_printed() {
        let dir = temp_test_dir();
        let path = dir.path().join("incidents_active.geojson");
        let doc = json!({"type": "FeatureCollection", "features": [{"properties": {"IsActive": true}}]});

        write_atomic(&path, &doc).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, serde_json::to_string_pretty(&doc).unwrap());
        assert!(content.contains("\n  \"features\": ["));
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let dir = temp_test_dir();
        let path = dir.path().join("incidents_all.geojson");

        write_atomic(&path, &json!({"version": 1})).unwrap();
        write_atomic(&path, &json!({"version": 2})).unwrap();

        assert_eq!(read_json_file(&path), json!({"version": 2}));
        assert_eq!(list_file_names(dir.path()), vec!["incidents_all.geojson"]);
    }

    #[test]
    fn test_serialize_failure_keeps_previous_file() {
        let dir = temp_test_dir();
        let path = dir.path().join("incidents_all.geojson");
        write_atomic(&path, &json!({"version": 1})).unwrap();
        let before = fs::read(&path).unwrap();

        let err = write_atomic(&path, &Exploding).unwrap_err();

        assert!(matches!(err, CacherError::Persist { .. }));
        assert_eq!(fs::read(&path).unwrap(), before);
        // No temporary file left behind.
        assert_eq!(list_file_names(dir.path()), vec!["incidents_all.geojson"]);
    }

    #[test]
    fn test_serialize_failure_creates_no_target() {
        let dir = temp_test_dir();
        let path = dir.path().join("incidents_all.geojson");

        assert!(write_atomic(&path, &Exploding).is_err());

        assert!(!path.exists());
        assert!(list_file_names(dir.path()).is_empty());
    }

    #[test]
    fn test_rename_failure_cleans_up_temp_file() {
        let dir = temp_test_dir();
        // A non-empty directory at the target path makes the rename fail.
        let path = dir.path().join("incidents_all.geojson");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let err = write_atomic(&path, &json!({"features": []})).unwrap_err();

        match err {
            CacherError::Persist { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(list_file_names(dir.path()), vec!["incidents_all.geojson"]);
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_round_trip_preserves_document() {
        let dir = temp_test_dir();
        let path = dir.path().join("incidents_all.geojson");
        let doc = test_utils::incidents::calfire_sample();

        write_atomic(&path, &doc).unwrap();

        assert_eq!(read_json_file(&path), doc);
    }

    #[test]
    fn test_upstream_numbers_written_exactly() {
        let dir = temp_test_dir();
        let path = dir.path().join("incidents_all.geojson");
        let doc: serde_json::Value =
            serde_json::from_str(test_utils::incidents::PRECISE_COLLECTION_TEXT).unwrap();

        write_atomic(&path, &doc).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        for literal in test_utils::incidents::PRECISE_NUMBER_LITERALS {
            assert!(content.contains(literal), "{literal} altered in:\n{content}");
        }
    }

    #[test]
    fn test_parent_dir_of_bare_file_name() {
        assert_eq!(parent_dir(Path::new("incidents_all.geojson")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("/data/a.geojson")), PathBuf::from("/data"));
    }
}
