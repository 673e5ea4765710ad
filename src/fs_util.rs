use std::fs;
use std::io::Write;

use camino::Utf8Path;

use crate::error::FilterError;

/// Writes `content` to `path` via a temp file in the same directory, creating
/// missing parent directories. An existing file is replaced.
pub fn write_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), FilterError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| FilterError::Filesystem(format!("create {parent}: {err}")))?;

    let mut temp = tempfile::Builder::new()
        .prefix(".water-filter")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| FilterError::Filesystem(err.to_string()))?;
    temp.write_all(content)
        .map_err(|err| FilterError::Filesystem(format!("write {path}: {err}")))?;
    temp.flush()
        .map_err(|err| FilterError::Filesystem(format!("write {path}: {err}")))?;
    temp.persist(path.as_std_path())
        .map_err(|err| FilterError::Filesystem(format!("persist {path}: {}", err.error)))?;
    Ok(())
}
