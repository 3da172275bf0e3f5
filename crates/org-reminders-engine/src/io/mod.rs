use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read the org file at `path`.
pub fn read_org_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Read the org file at `path`, treating a missing file as empty.
pub fn read_org_file_or_empty(path: &Path) -> Result<String, IoError> {
    match read_org_file(path) {
        Err(IoError::NotFound(missing)) => {
            log::info!("{} does not exist yet, starting empty", missing.display());
            Ok(String::new())
        }
        other => other,
    }
}

/// Overwrite the org file at `path` with `content`.
pub fn write_org_file(path: &Path, content: &str) -> Result<(), IoError> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(path, content).map_err(IoError::Io)
}
