//! Filesystem boundary.
//!
//! Everything that touches disk goes through [`FileSystem`], so the scanner
//! and navigator can be exercised against [`memory::MemoryFileSystem`].

pub mod memory;

use crate::models::DirectoryEntry;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("Path not found: {0}")]
    NotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl FsError {
    fn from_io(path: &Path, source: std::io::Error) -> Self {
        match source.kind() {
            ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => FsError::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotADirectory => FsError::NotADirectory(path.to_path_buf()),
            _ => FsError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

pub trait FileSystem: Send + Sync {
    /// List the direct children of `path`. Order is unspecified.
    fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, FsError>;
    fn path_exists(&self, path: &Path) -> bool;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, FsError> {
        (**self).list_directory(path)
    }

    fn path_exists(&self, path: &Path) -> bool {
        (**self).path_exists(path)
    }
}

impl<T: FileSystem + ?Sized> FileSystem for Arc<T> {
    fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, FsError> {
        (**self).list_directory(path)
    }

    fn path_exists(&self, path: &Path) -> bool {
        (**self).path_exists(path)
    }
}

/// The real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl StdFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, FsError> {
        let entries = fs::read_dir(path).map_err(|e| FsError::from_io(path, e))?;

        let mut listing = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Skipping unreadable entry in {}: {e}", path.display());
                    continue;
                }
            };
            let entry_path = entry.path();

            // Follow symlinks so linked folders browse like folders; fall back
            // to the link itself when the target is gone.
            let metadata = match fs::metadata(&entry_path).or_else(|_| entry.metadata()) {
                Ok(metadata) => metadata,
                Err(e) => {
                    log::debug!("Skipping {}: {e}", entry_path.display());
                    continue;
                }
            };

            let modified_at = metadata.modified().unwrap_or_else(|_| SystemTime::now());
            let mut item = if metadata.is_dir() {
                DirectoryEntry::directory(entry_path, modified_at)
            } else {
                DirectoryEntry::file(entry_path, metadata.len(), modified_at)
            };
            item.name = entry.file_name().to_string_lossy().into_owned();
            listing.push(item);
        }

        Ok(listing)
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
