//! Local filesystem service (`READ_FILE`).
//!
//! Paths are taken as given and resolved against the process working
//! directory. Reads are blocking; the dispatcher always runs them on the
//! blocking pool.

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::FileContent;

// ============================================================================
// FileService
// ============================================================================

/// Reads files on behalf of the UI.
pub trait FileService: Send + Sync {
    /// Reads the file named by `payload.path`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPayload`] if `path` is missing, empty or not a string
    /// - [`Error::NotFound`] if the path does not exist
    /// - [`Error::Io`] for any other read failure
    fn read_file(&self, payload: &Value) -> Result<FileContent>;
}

// ============================================================================
// LocalFiles
// ============================================================================

/// [`FileService`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFiles;

impl LocalFiles {
    /// Creates the service.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FileService for LocalFiles {
    fn read_file(&self, payload: &Value) -> Result<FileContent> {
        let requested = requested_path(payload)?;
        let path = Path::new(requested);
        let absolute = absolute_path(path);

        debug!(path = %absolute.display(), "Reading file");

        let bytes = fs::read(path).map_err(|e| Error::io(&absolute, e))?;
        let size = bytes.len() as u64;
        let content = String::from_utf8(bytes).map_err(|e| {
            Error::io(
                &absolute,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;

        Ok(FileContent {
            content,
            size,
            path: requested.to_string(),
            absolute_path: absolute.display().to_string(),
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Extracts the non-empty `path` field.
fn requested_path(payload: &Value) -> Result<&str> {
    let object = payload
        .as_object()
        .ok_or_else(|| Error::invalid_payload("payload must be an object"))?;

    match object.get("path") {
        Some(Value::String(path)) if !path.is_empty() => Ok(path.as_str()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            Err(Error::invalid_payload("'path' is required"))
        }
        Some(_) => Err(Error::invalid_payload("'path' must be a string")),
    }
}

/// Resolves `path` against the working directory without touching it.
fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_read_existing_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "olá, mundo").expect("write");
        let path = file.path().display().to_string();

        let content = LocalFiles::new()
            .read_file(&json!({ "path": path }))
            .expect("read");

        assert_eq!(content.content, "olá, mundo");
        assert_eq!(content.size, "olá, mundo".len() as u64);
        assert_eq!(content.path, path);
        assert!(Path::new(&content.absolute_path).is_absolute());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = LocalFiles::new()
            .read_file(&json!({ "path": "/definitely/missing/file.txt" }))
            .expect_err("should fail");
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_missing_path_is_invalid_payload() {
        let err = LocalFiles::new().read_file(&json!({})).expect_err("should fail");
        assert!(matches!(err, Error::InvalidPayload { .. }));
    }

    #[test]
    fn test_empty_path_is_invalid_payload() {
        let err = LocalFiles::new()
            .read_file(&json!({ "path": "" }))
            .expect_err("should fail");
        assert!(matches!(err, Error::InvalidPayload { .. }));
    }

    #[test]
    fn test_non_object_payload_is_invalid() {
        for payload in [json!(null), json!("a.txt"), json!([1, 2])] {
            let err = LocalFiles::new().read_file(&payload).expect_err("should fail");
            assert!(matches!(err, Error::InvalidPayload { .. }), "{payload}");
        }
    }

    #[test]
    fn test_non_string_path_is_invalid() {
        let err = LocalFiles::new()
            .read_file(&json!({ "path": 12 }))
            .expect_err("should fail");
        assert!(matches!(err, Error::InvalidPayload { .. }));
    }

    #[test]
    fn test_file_used_as_directory_is_io_failure() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let nested = file.path().join("child.txt");

        let err = LocalFiles::new()
            .read_file(&json!({ "path": nested.display().to_string() }))
            .expect_err("should fail");
        assert!(matches!(err, Error::Io { .. }), "{err:?}");
    }

    #[test]
    fn test_directory_is_io_failure() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = LocalFiles::new()
            .read_file(&json!({ "path": dir.path().display().to_string() }))
            .expect_err("should fail");
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_non_utf8_is_io_failure() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(&[0xff, 0xfe, 0xfd]).expect("write");

        let err = LocalFiles::new()
            .read_file(&json!({ "path": file.path().display().to_string() }))
            .expect_err("should fail");
        assert!(matches!(err, Error::Io { .. }));
    }
}
