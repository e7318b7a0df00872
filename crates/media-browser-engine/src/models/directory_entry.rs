use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    /// Stable identity of the entry within a listing
    pub absolute_path: PathBuf,
    pub is_directory: bool,
    pub modified_at: SystemTime,
    /// Only meaningful for files
    pub size_bytes: Option<u64>,
    /// Filled in by the navigator for directories; `Some(0)` when unreadable
    pub child_count: Option<usize>,
}

impl DirectoryEntry {
    pub fn file(path: impl Into<PathBuf>, size_bytes: u64, modified_at: SystemTime) -> Self {
        let absolute_path = path.into();
        Self {
            name: file_name_of(&absolute_path),
            absolute_path,
            is_directory: false,
            modified_at,
            size_bytes: Some(size_bytes),
            child_count: None,
        }
    }

    pub fn directory(path: impl Into<PathBuf>, modified_at: SystemTime) -> Self {
        let absolute_path = path.into();
        Self {
            name: file_name_of(&absolute_path),
            absolute_path,
            is_directory: true,
            modified_at,
            size_bytes: None,
            child_count: None,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// Label shown under a directory, e.g. "1 item" or "12 items"
    pub fn child_count_label(&self) -> Option<String> {
        let count = self.child_count?;
        let noun = if count == 1 { "item" } else { "items" };
        Some(format!("{count} {noun}"))
    }

    /// Modification time as shown in listings, e.g. "3 Mar 14:05", with the
    /// year added when it is not the current one
    pub fn modified_label(&self) -> String {
        self.modified_label_at(&Local::now())
    }

    /// [`Self::modified_label`] relative to `now`, rendered in `now`'s zone
    pub fn modified_label_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> String
    where
        Tz::Offset: Display,
    {
        let modified = DateTime::<Utc>::from(self.modified_at).with_timezone(&now.timezone());
        if modified.year() == now.year() {
            modified.format("%-d %b %H:%M").to_string()
        } else {
            modified.format("%-d %b %Y %H:%M").to_string()
        }
    }
}

/// Last path component as display text, falling back to the whole path.
pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
