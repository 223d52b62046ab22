//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Read file contents with standardized error handling.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Write content to file with standardized error handling.
pub fn write_file(path: &Path, content: &str, operation: &str) -> Result<()> {
    fs::write(path, content)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}

/// Write content to file atomically (write to .tmp, then rename).
///
/// Readers see either the old content or the new content, never a partial write.
pub fn write_file_atomic(path: &Path, content: &str, operation: &str) -> Result<()> {
    let invalid = || {
        Error::internal_io(
            format!("Invalid path: {}", path.display()),
            Some(operation.to_string()),
        )
    };
    let parent = path.parent().ok_or_else(invalid)?;
    let filename = path.file_name().ok_or_else(invalid)?;

    let tmp_path = parent.join(format!("{}.tmp", filename.to_string_lossy()));

    fs::write(&tmp_path, content).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("{} (write temp)", operation)))
    })?;

    fs::rename(&tmp_path, path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("{} (rename)", operation))))?;

    Ok(())
}

/// Recursively copy `src` into `dest`, skipping directories named in `skip`.
///
/// `dest` must not exist yet. Symlinks are copied as the files they point to.
pub fn copy_dir_recursive(src: &Path, dest: &Path, skip: &[&str]) -> Result<usize> {
    if dest.exists() {
        return Err(Error::internal_io(
            format!("Destination already exists: {}", dest.display()),
            Some("copy directory".to_string()),
        ));
    }

    let mut copied = 0;
    copy_recursive(src, dest, skip, &mut copied)?;
    Ok(copied)
}

fn copy_recursive(src: &Path, dest: &Path, skip: &[&str], copied: &mut usize) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("create {}", dest.display())))
    })?;

    let entries = fs::read_dir(src)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("read {}", src.display()))))?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::internal_io(e.to_string(), None))?;
        let path = entry.path();
        let name = entry.file_name();
        let target = dest.join(&name);

        if path.is_dir() {
            if skip.iter().any(|s| name.to_string_lossy() == *s) {
                continue;
            }
            copy_recursive(&path, &target, skip, copied)?;
        } else {
            fs::copy(&path, &target).map_err(|e| {
                Error::internal_io(e.to_string(), Some(format!("copy {}", path.display())))
            })?;
            *copied += 1;
        }
    }

    Ok(())
}

/// Remove a directory tree with standardized error handling.
pub fn remove_dir(path: &Path, operation: &str) -> Result<()> {
    fs::remove_dir_all(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(operation.to_string())))
}
