//! Extension-based content classification.
//!
//! This is the single source of truth for which files belong to which
//! gallery. The scanner filters with it and the router dispatches with it,
//! so a file that shows up in a gallery always opens in the matching viewer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic", "heif"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "mov", "avi", "webm", "3gp", "flv", "wmv"];
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "aac", "flac", "ogg", "m4a", "amr"];
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "ppt", "pptx", "xls", "xlsx"];

/// The four recognised content classes. Unclassified files are `None`
/// wherever a category is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Image,
    Video,
    Audio,
    Document,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Image,
        Category::Video,
        Category::Audio,
        Category::Document,
    ];

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Category::Image => IMAGE_EXTENSIONS,
            Category::Video => VIDEO_EXTENSIONS,
            Category::Audio => AUDIO_EXTENSIONS,
            Category::Document => DOCUMENT_EXTENSIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Document => "document",
        }
    }

    /// Parse a user-facing category name. Accepts singular and plural forms.
    pub fn parse(name: &str) -> Option<Category> {
        match name.trim().to_lowercase().as_str() {
            "image" | "images" | "photo" | "photos" => Some(Category::Image),
            "video" | "videos" => Some(Category::Video),
            "audio" | "music" => Some(Category::Audio),
            "document" | "documents" | "docs" => Some(Category::Document),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-cased text after the last `.`, if there is any.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Classify a file name by extension. Returns the first category whose set
/// contains the extension, or `None` for unclassified names.
pub fn classify(file_name: &str) -> Option<Category> {
    let ext = extension_of(file_name)?;
    Category::ALL
        .into_iter()
        .find(|category| category.extensions().contains(&ext.as_str()))
}

/// Classify using the final component of a path.
pub fn classify_path(path: &Path) -> Option<Category> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(classify)
}
