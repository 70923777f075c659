use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("directory {path:?} missing or not writable: {source}")]
    Dir { path: PathBuf, source: io::Error },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` if needed and checks it can hold new files.
pub fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    let dir_error = |source| PersistError::Dir {
        path: dir.to_path_buf(),
        source,
    };
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => {
            return Err(dir_error(io::Error::new(
                io::ErrorKind::Other,
                "path is not a directory",
            )))
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(dir_error)?;
        }
        Err(err) => return Err(dir_error(err)),
    }
    NamedTempFile::new_in(dir).map_err(dir_error)?;
    Ok(())
}

/// Writes `{dir}/{filename}` through a synced temp file and a rename, so
/// readers never see a half-written file.
pub fn write_atomic(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
    ensure_dir(dir)?;
    let target = dir.join(filename);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
    Ok(target)
}
