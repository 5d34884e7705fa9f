//! Filesystem primitives used by the codec
//!
//! Thin wrappers around `std::fs` that map failures to [`ErrorKind::Io`]
//! with the offending path attached. The codec never catches these; they
//! propagate to the caller unmodified.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Read a file's raw bytes
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, &e))
}

/// Read a file as UTF-8 text
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, &e))
}

/// Write raw bytes, replacing any existing file
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| Error::io(path, &e))
}

/// Write text, replacing any existing file
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|e| Error::io(path, &e))
}

/// Check whether a path exists
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// List a directory's entry names in directory order; no sorting is imposed
pub fn list_entries(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, &e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, &e))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Create a directory and any missing parents; a no-op if it already exists
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, &e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_read_missing_file_is_io_error() {
        let err = read_text(Path::new("/nonexistent/theme_options.json")).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io(_)));
        assert!(err.message().contains("theme_options.json"));
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(exists(&nested));
    }

    #[test]
    fn test_list_entries() {
        let dir = tempfile::tempdir().unwrap();
        write_text(&dir.path().join("one.txt"), "1").unwrap();
        write_text(&dir.path().join("two.txt"), "2").unwrap();

        let mut names = list_entries(dir.path()).unwrap();
        names.sort();
        assert_eq!(names, vec!["one.txt", "two.txt"]);
    }
}
