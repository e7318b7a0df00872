pub mod cache;
pub mod classify;
pub mod gallery;
pub mod io;
pub mod models;
pub mod navigator;
pub mod permissions;
pub mod router;
pub mod scanner;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use cache::GalleryCache;
pub use classify::{Category, classify, classify_path};
pub use gallery::{Galleries, GalleryMount, GallerySources, LoadOutcome};
pub use io::{FileSystem, FsError, StdFileSystem};
pub use models::{DirectoryEntry, GalleryItem, Selection, SelectionSet, TapAction};
pub use navigator::{BrowserState, ListingStatus, NavOutcome, Navigator};
pub use permissions::{
    BootstrapOutcome, CapabilityTier, FlagStore, PermissionBridge, PermissionGateway, Platform,
    run_first_launch,
};
pub use router::{Route, Viewer, ViewerTarget, route, route_file};
pub use scanner::{ScanIssue, ScanLimits, ScanReport, scan, scan_with_report};
