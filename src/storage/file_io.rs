//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't leave a half-written output
//! behind on failure.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{BillError, BillResult};

/// Fail unless the directory `path` would be written into exists
///
/// Output directories are never created implicitly.
pub fn require_parent_dir(path: &Path) -> BillResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(BillError::MissingOutputDir {
                path: parent.to_path_buf(),
            })
        }
        _ => Ok(()),
    }
}

/// Write a file atomically (write to temp, then rename)
///
/// `fill` receives a buffered writer for the temp file. The target is either
/// completely written or left untouched.
pub fn write_atomic<P, F>(path: P, fill: F) -> BillResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> BillResult<()>,
{
    let path = path.as_ref();
    require_parent_dir(path)?;

    let temp_path = temp_path_for(path);

    let file = File::create(&temp_path).map_err(|e| {
        BillError::Io(format!(
            "Failed to create temp file {}: {}",
            temp_path.display(),
            e
        ))
    })?;

    let mut writer = BufWriter::new(file);
    let result = fill(&mut writer).and_then(|_| {
        writer
            .flush()
            .map_err(|e| BillError::Io(format!("Failed to flush data: {}", e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| BillError::Io(format!("Failed to sync data: {}", e)))
    });

    if let Err(e) = result {
        drop(writer);
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    drop(writer);

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        BillError::Io(format!("Failed to write {}: {}", path.display(), e))
    })?;

    Ok(())
}

/// Write UTF-8 text atomically
pub fn write_text_atomic<P: AsRef<Path>>(path: P, contents: &str) -> BillResult<()> {
    write_atomic(path, |writer| {
        writer
            .write_all(contents.as_bytes())
            .map_err(|e| BillError::Io(format!("Failed to write data: {}", e)))
    })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
