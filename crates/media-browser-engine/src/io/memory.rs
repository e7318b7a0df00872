use crate::io::{FileSystem, FsError};
use crate::models::DirectoryEntry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
struct Node {
    is_directory: bool,
    size_bytes: u64,
    modified_at: SystemTime,
}

/// In-memory directory tree for tests and benchmarks.
///
/// Adding a path creates its missing ancestors as directories. Paths marked
/// with [`MemoryFileSystem::deny`] exist but fail to list, like a directory
/// the process has no permission to read. Every listing attempt is recorded.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    nodes: BTreeMap<PathBuf, Node>,
    denied: BTreeSet<PathBuf>,
    listed: Mutex<Vec<PathBuf>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.add_dir(path);
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.add_file(path, 0);
        self
    }

    pub fn add_dir(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.add_ancestors(&path);
        self.nodes.insert(
            path,
            Node {
                is_directory: true,
                size_bytes: 0,
                modified_at: SystemTime::UNIX_EPOCH,
            },
        );
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, size_bytes: u64) {
        let path = path.into();
        self.add_ancestors(&path);
        let modified_at = SystemTime::UNIX_EPOCH + Duration::from_secs(size_bytes);
        self.nodes.insert(
            path,
            Node {
                is_directory: false,
                size_bytes,
                modified_at,
            },
        );
    }

    /// Make a directory unreadable
    pub fn deny(&mut self, path: impl Into<PathBuf>) {
        self.denied.insert(path.into());
    }

    /// Remove a path and everything below it
    pub fn remove(&mut self, path: &Path) {
        self.nodes.retain(|p, _| !p.starts_with(path));
    }

    /// Every path passed to `list_directory`, in call order
    pub fn listed_paths(&self) -> Vec<PathBuf> {
        self.listed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn add_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(Node {
                    is_directory: true,
                    size_bytes: 0,
                    modified_at: SystemTime::UNIX_EPOCH,
                });
        }
    }
}

impl FileSystem for MemoryFileSystem {
    fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, FsError> {
        self.listed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_path_buf());

        let node = self
            .nodes
            .get(path)
            .ok_or_else(|| FsError::NotFound(path.to_path_buf()))?;
        if !node.is_directory {
            return Err(FsError::NotADirectory(path.to_path_buf()));
        }
        if self.denied.contains(path) {
            return Err(FsError::PermissionDenied(path.to_path_buf()));
        }

        Ok(self
            .nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(path))
            .map(|(child, node)| {
                if node.is_directory {
                    DirectoryEntry::directory(child.clone(), node.modified_at)
                } else {
                    DirectoryEntry::file(child.clone(), node.size_bytes, node.modified_at)
                }
            })
            .collect())
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.nodes.contains_key(path)
    }
}
