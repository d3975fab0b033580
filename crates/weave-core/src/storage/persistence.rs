//! Crash-safe file persistence
//!
//! Notes are written with the temp-file-then-rename pattern: the bytes go
//! to `{target}.tmp` in the same directory, are synced, and the temp file is
//! renamed over the target. Rename is atomic within one filesystem, so a
//! reader opening the target sees either the old or the new content.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::{StoreError, StoreResult};

/// Suffix appended to the target file name for the in-flight copy
pub const TEMP_SUFFIX: &str = ".tmp";

/// Path of the temporary sibling used while writing `path`
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

/// Write data to a file atomically
///
/// 1. Write to `{path}.tmp`
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// On failure the temp file is removed and the target is left untouched.
/// The parent directory must already exist.
pub fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    let temp_path = temp_path_for(path);

    if let Err(e) = write_synced(&temp_path, data) {
        remove_temp(&temp_path);
        return Err(e);
    }

    if let Err(source) = fs::rename(&temp_path, path) {
        remove_temp(&temp_path);
        return Err(StoreError::AtomicWriteFailed {
            from: temp_path,
            to: path.to_path_buf(),
            source,
        });
    }

    debug!("Wrote {} bytes to {:?}", data.len(), path);
    Ok(())
}

fn write_synced(temp_path: &Path, data: &[u8]) -> StoreResult<()> {
    let mut file = File::create(temp_path)
        .map_err(|e| StoreError::from_io("create temp file", temp_path.to_path_buf(), e))?;

    file.write_all(data)
        .map_err(|e| StoreError::from_io("write temp file", temp_path.to_path_buf(), e))?;

    file.sync_all()
        .map_err(|e| StoreError::from_io("sync temp file", temp_path.to_path_buf(), e))?;

    Ok(())
}

fn remove_temp(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove temp file {:?}: {}", temp_path, e);
        }
    }
}
