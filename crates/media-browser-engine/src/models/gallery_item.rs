use crate::models::DirectoryEntry;
use std::path::PathBuf;

/// A classified file shown in one of the type-specific galleries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GalleryItem {
    pub path: PathBuf,
    pub display_name: String,
}

impl GalleryItem {
    pub fn new(path: impl Into<PathBuf>, display_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            display_name: display_name.into(),
        }
    }
}

impl From<&DirectoryEntry> for GalleryItem {
    fn from(entry: &DirectoryEntry) -> Self {
        let display_name = if entry.name.is_empty() {
            entry.absolute_path.to_string_lossy().into_owned()
        } else {
            entry.name.clone()
        };
        Self {
            path: entry.absolute_path.clone(),
            display_name,
        }
    }
}
