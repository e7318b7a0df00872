//! Current-directory model behind the generic file browser.
//!
//! Unlike the galleries, the browser never caches: every move re-lists the
//! target directory so freshly copied files show up immediately.

use crate::classify::classify;
use crate::io::{FileSystem, FsError};
use crate::models::DirectoryEntry;
use crate::router::{Route, route};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

pub const ROOT_DISPLAY_NAME: &str = "Internal storage";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingStatus {
    Loaded,
    /// Listing succeeded but the directory has nothing in it
    Empty,
    /// Listing failed; the message is meant for an error banner
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserState {
    pub current_path: PathBuf,
    /// Direct filesystem parent; `None` only at `/`, where back leaves the
    /// browser
    pub parent_path: Option<PathBuf>,
    /// Directories first, then files, each ordered by name
    pub entries: Vec<DirectoryEntry>,
    pub status: ListingStatus,
}

/// Result of a user action in the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// The current directory changed and was re-listed
    Listed,
    /// A classified file was selected; the host should open this route
    Open(Route),
    /// Selection of an unsupported file, nothing happens
    Ignored,
    /// Back was pressed at `/`; the enclosing stack should pop the browser
    Exit,
}

pub struct Navigator<F: FileSystem> {
    fs: F,
    root: PathBuf,
    state: BrowserState,
}

impl<F: FileSystem> Navigator<F> {
    /// Start browsing at `root`. Back from there still climbs to its parent.
    pub fn new(fs: F, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let state = load_state(&fs, &root);
        Self { fs, root, state }
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn current_path(&self) -> &Path {
        &self.state.current_path
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.state.entries
    }

    pub fn enter(&mut self, entry: &DirectoryEntry) -> NavOutcome {
        if entry.is_directory {
            self.change_to(entry.absolute_path.clone());
            return NavOutcome::Listed;
        }

        match classify(&entry.name) {
            Some(category) => NavOutcome::Open(Route::Viewer(route(&entry.absolute_path, category))),
            None => {
                log::debug!("No viewer for {}", entry.absolute_path.display());
                NavOutcome::Ignored
            }
        }
    }

    /// Enter the entry at `index` of the current listing
    pub fn enter_index(&mut self, index: usize) -> NavOutcome {
        match self.state.entries.get(index).cloned() {
            Some(entry) => self.enter(&entry),
            None => NavOutcome::Ignored,
        }
    }

    pub fn back(&mut self) -> NavOutcome {
        match self.state.parent_path.clone() {
            Some(parent) => {
                self.change_to(parent);
                NavOutcome::Listed
            }
            None => NavOutcome::Exit,
        }
    }

    /// Re-list the current directory
    pub fn refresh(&mut self) {
        let current = self.state.current_path.clone();
        self.change_to(current);
    }

    /// Name for the path indicator: the directory name, or a fixed label at
    /// the root.
    pub fn current_directory_name(&self) -> String {
        if self.state.current_path == self.root {
            return ROOT_DISPLAY_NAME.to_string();
        }
        self.state
            .current_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| ROOT_DISPLAY_NAME.to_string())
    }

    fn change_to(&mut self, path: PathBuf) {
        self.state = load_state(&self.fs, &path);
    }
}

fn load_state(fs: &dyn FileSystem, current: &Path) -> BrowserState {
    let (entries, status) = match list_directory(fs, current) {
        Ok(entries) if entries.is_empty() => (entries, ListingStatus::Empty),
        Ok(entries) => (entries, ListingStatus::Loaded),
        Err(e) => {
            log::error!("Error loading files: {e}");
            (Vec::new(), ListingStatus::Failed("Failed to load files".to_string()))
        }
    };

    BrowserState {
        current_path: current.to_path_buf(),
        parent_path: parent_of(current),
        entries,
        status,
    }
}

/// List `path` for display: child counts filled in for directories and the
/// result sorted directories-first, then by name.
pub fn list_directory(fs: &dyn FileSystem, path: &Path) -> Result<Vec<DirectoryEntry>, FsError> {
    let mut entries = fs.list_directory(path)?;
    for entry in entries.iter_mut().filter(|e| e.is_directory) {
        let count = match fs.list_directory(&entry.absolute_path) {
            Ok(children) => children.len(),
            Err(e) => {
                log::debug!("Counting children failed: {e}");
                0
            }
        };
        entry.child_count = Some(count);
    }
    entries.sort_by(compare_entries);
    Ok(entries)
}

fn compare_entries(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    b.is_directory
        .cmp(&a.is_directory)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Direct parent of `current`, or `None` when it has no distinct parent.
/// The starting root is not a ceiling: back from it climbs further up.
pub fn parent_of(current: &Path) -> Option<PathBuf> {
    current
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty() && *parent != current)
        .map(Path::to_path_buf)
}
