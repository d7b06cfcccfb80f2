use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::error::{AppError, Result};

/// File-system helpers the importers depend on
pub trait FileStore {
    fn join_path(&self, dir: &Path, file_name: &str) -> PathBuf {
        dir.join(file_name)
    }

    /// Fails with `NotFound` when `path` does not exist
    fn check_if_file_exists(&self, path: &Path) -> Result<()>;

    /// Write `contents` to `path`, truncating when `overwrite` is set and
    /// appending otherwise
    fn store_file(&self, path: &Path, contents: &[u8], overwrite: bool) -> Result<()>;

    fn remove_file(&self, path: &Path) -> Result<()>;

    /// File name without directory and extension
    fn get_main_file_name(&self, path: &Path) -> String {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// `FileStore` backed by the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl FileStore for LocalFileStore {
    fn check_if_file_exists(&self, path: &Path) -> Result<()> {
        if path.is_file() {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Input file does not exist: {}",
                path.display()
            )))
        }
    }

    fn store_file(&self, path: &Path, contents: &[u8], overwrite: bool) -> Result<()> {
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(!overwrite)
            .truncate(overwrite)
            .open(path)
            .map_err(|e| {
                AppError::IoError(format!("Failed to open {} for writing: {}", path.display(), e))
            })?;

        file.write_all(contents).map_err(|e| {
            AppError::IoError(format!("Failed to write {}: {}", path.display(), e))
        })
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::IoError(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
