use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{StorageError, StorageResult};

/// Reads a JSON list. A missing file is an empty list; a file that does not
/// parse is [`StorageError::Corrupt`].
pub fn read_record<T: DeserializeOwned>(path: &Path) -> StorageResult<Vec<T>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    // `null` is what an empty list looked like in records from older builds.
    let items: Option<Vec<T>> = serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(items.unwrap_or_default())
}

/// Replaces the record atomically: the list is written to a temporary file
/// next to `path` and renamed over it, so readers see the old or the new
/// record and never a partial one.
pub fn write_record<T: Serialize>(path: &Path, items: &[T]) -> StorageResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let io_error = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(io_error)?;
    let raw = serde_json::to_vec(items).map_err(StorageError::Serialize)?;

    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(&raw).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|err| io_error(err.error))?;

    tracing::debug!(path = %path.display(), count = items.len(), "record written");
    Ok(())
}
