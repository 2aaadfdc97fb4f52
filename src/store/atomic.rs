//! Atomic file replacement
//!
//! Readers of the versions directory must never observe a partial file,
//! including readers in other processes. Every write goes through:
//! 1. Write to a uniquely named temp file in the target directory
//! 2. fsync the temp file
//! 3. Rename temp to final (atomic on POSIX and NTFS)
//! 4. fsync the directory (best effort)

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::errors::{LexiconError, LexiconResult};

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
}

/// Atomically replace `path` with `bytes`.
///
/// On failure the temp file is removed and `path` is left untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> LexiconResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| LexiconError::io_at(parent, e))?;
    }

    let temp_path = temp_path_for(path);
    let result = write_and_rename(&temp_path, path, bytes);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> LexiconResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)
        .map_err(|e| LexiconError::io_at(temp_path, e))?;

    file.write_all(bytes)
        .map_err(|e| LexiconError::io_at(temp_path, e))?;
    file.sync_all()
        .map_err(|e| LexiconError::io_at(temp_path, e))?;
    drop(file);

    fs::rename(temp_path, path).map_err(|e| LexiconError::io_at(path, e))?;

    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

/// Remove a file written earlier in a failed multi-file operation.
pub fn discard(path: &Path) {
    if path.exists() {
        let _ = fs::remove_file(path);
    }
}
