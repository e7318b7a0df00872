//! Maps selections to destinations of the host's screen stack.
//!
//! The host owns navigation; the engine only says where to go and with what
//! payload, as a `(screen name, payload)` pair.

use crate::classify::{Category, classify_path};
use crate::models::GalleryItem;
use std::path::Path;

const FILE_SCHEME: &str = "file://";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Viewer {
    Image,
    Video,
    Audio,
    Document,
}

impl Viewer {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Image => Viewer::Image,
            Category::Video => Viewer::Video,
            Category::Audio => Viewer::Audio,
            Category::Document => Viewer::Document,
        }
    }

    pub fn screen_name(self) -> &'static str {
        match self {
            Viewer::Image => "ImageGallery",
            Viewer::Video => "VideoGallery",
            Viewer::Audio => "AudioGallery",
            Viewer::Document => "DocumentsGallery",
        }
    }
}

/// A viewer to open, positioned at `start_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerTarget {
    pub viewer: Viewer,
    /// `file://` URI of the selected file
    pub start_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Viewer(ViewerTarget),
    /// Hand-off to the send flow. The transfer itself is not implemented.
    Share { images: Vec<GalleryItem> },
}

impl Route {
    pub fn screen_name(&self) -> &'static str {
        match self {
            Route::Viewer(target) => target.viewer.screen_name(),
            Route::Share { .. } => "SendScreen",
        }
    }
}

/// Viewer for a file already known to be in `category`
pub fn route(path: &Path, category: Category) -> ViewerTarget {
    ViewerTarget {
        viewer: Viewer::for_category(category),
        start_at: file_uri(path),
    }
}

/// Classify `path` and route it. Unclassified files have no destination.
pub fn route_file(path: &Path) -> Option<Route> {
    let category = classify_path(path)?;
    Some(Route::Viewer(route(path, category)))
}

/// Route to the send flow; nothing to send means no route.
pub fn share(images: Vec<GalleryItem>) -> Option<Route> {
    if images.is_empty() {
        return None;
    }
    Some(Route::Share { images })
}

pub fn file_uri(path: &Path) -> String {
    let path = path.to_string_lossy();
    if path.starts_with(FILE_SCHEME) {
        path.into_owned()
    } else {
        format!("{FILE_SCHEME}{path}")
    }
}
