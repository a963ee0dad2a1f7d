//! Output directory handling.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors while preparing or inspecting the output directory.
#[derive(Debug, Error)]
pub enum OutputDirError {
    #[error("Failed to create output directory '{}': {source}", path.display())]
    Create { path: PathBuf, source: io::Error },

    #[error("Failed to read output directory '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("'{}' exists but is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// Re-downloading into a populated directory would overwrite earlier results
    #[error(
        "Output directory '{}' already contains {files} file(s); delete it before re-downloading",
        path.display()
    )]
    NotEmpty { path: PathBuf, files: usize },
}

/// How an existing output directory is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Keep existing files and skip their coordinates
    Resume,
    /// Download everything; the directory must be new or empty
    Redownload,
}

/// State of the output directory after preparation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreparedDir {
    Created,
    Existing { files: usize },
}

/// Makes sure `dir` exists and is usable for `mode`.
pub fn prepare_output_dir(dir: &Path, mode: OutputMode) -> Result<PreparedDir, OutputDirError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| OutputDirError::Create {
            path: dir.to_path_buf(),
            source,
        })?;
        info!("Directory {} created", dir.display());
        return Ok(PreparedDir::Created);
    }

    if !dir.is_dir() {
        return Err(OutputDirError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let files = count_files(dir)?;
    if mode == OutputMode::Redownload && files > 0 {
        return Err(OutputDirError::NotEmpty {
            path: dir.to_path_buf(),
            files,
        });
    }

    info!(
        "Directory {} exists with {} file(s)",
        dir.display(),
        files
    );
    Ok(PreparedDir::Existing { files })
}

/// Number of regular files directly inside `dir`.
pub fn count_files(dir: &Path) -> Result<usize, OutputDirError> {
    let read_err = |source| OutputDirError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut count = 0;
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        if entry.map_err(read_err)?.file_type().map_err(read_err)?.is_file() {
            count += 1;
        }
    }
    Ok(count)
}
