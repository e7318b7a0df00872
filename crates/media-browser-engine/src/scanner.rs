//! Bounded recursive search for one category of files across several roots.
//!
//! A scan never fails: missing roots are skipped, unreadable directories are
//! treated as empty, and whatever was collected up to that point is returned.
//! The issues encountered along the way are reported next to the items.

use crate::classify::{Category, classify};
use crate::io::{FileSystem, FsError};
use crate::models::{DirectoryEntry, GalleryItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_MAX_RESULTS: usize = 800;

/// Bounds applied to every gallery scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanLimits {
    /// Directory levels to descend below each root. `0` lists the root only.
    pub max_depth: usize,
    /// Hard cap on the number of results across all roots
    pub max_results: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Something that went wrong during a scan without stopping it
#[derive(Debug, thiserror::Error)]
pub enum ScanIssue {
    #[error("Root does not exist: {0}")]
    RootMissing(PathBuf),
    #[error("Could not read {path}: {source}")]
    DirectoryUnreadable { path: PathBuf, source: FsError },
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub items: Vec<GalleryItem>,
    pub issues: Vec<ScanIssue>,
    /// True when the result cap stopped the scan early
    pub truncated: bool,
}

/// Collect files of `category` under `roots`, in root priority order.
pub fn scan(
    fs: &dyn FileSystem,
    roots: &[PathBuf],
    category: Category,
    limits: ScanLimits,
) -> Vec<GalleryItem> {
    scan_with_report(fs, roots, category, limits).items
}

/// Like [`scan`], but also reports skipped roots and unreadable directories.
pub fn scan_with_report(
    fs: &dyn FileSystem,
    roots: &[PathBuf],
    category: Category,
    limits: ScanLimits,
) -> ScanReport {
    let mut scan = Scan {
        fs,
        category,
        max_results: limits.max_results,
        seen: HashSet::new(),
        report: ScanReport::default(),
    };

    for root in roots {
        if scan.is_full() {
            break;
        }
        if !fs.path_exists(root) {
            log::debug!("Skipping missing {category} root {}", root.display());
            scan.report.issues.push(ScanIssue::RootMissing(root.clone()));
            continue;
        }
        scan.visit(root, limits.max_depth);
    }

    scan.report.truncated = scan.is_full();
    log::info!(
        "Scanned {} root(s) for {category}: {} item(s), {} issue(s)",
        roots.len(),
        scan.report.items.len(),
        scan.report.issues.len()
    );
    scan.report
}

struct Scan<'a> {
    fs: &'a dyn FileSystem,
    category: Category,
    max_results: usize,
    // Overlapping roots must not yield the same path twice
    seen: HashSet<PathBuf>,
    report: ScanReport,
}

impl Scan<'_> {
    fn is_full(&self) -> bool {
        self.report.items.len() >= self.max_results
    }

    fn visit(&mut self, dir: &Path, remaining_depth: usize) {
        if self.is_full() {
            return;
        }

        let entries = match self.fs.list_directory(dir) {
            Ok(entries) => entries,
            Err(source) => {
                log::warn!("Treating unreadable directory as empty: {source}");
                self.report.issues.push(ScanIssue::DirectoryUnreadable {
                    path: dir.to_path_buf(),
                    source,
                });
                return;
            }
        };

        for entry in entries {
            if self.is_full() {
                break;
            }
            if entry.is_hidden() {
                continue;
            }
            if entry.is_directory {
                if remaining_depth > 0 {
                    self.visit(&entry.absolute_path, remaining_depth - 1);
                }
            } else {
                self.consider(&entry);
            }
        }
    }

    fn consider(&mut self, entry: &DirectoryEntry) {
        if classify(&entry.name) != Some(self.category) {
            return;
        }
        if self.seen.insert(entry.absolute_path.clone()) {
            self.report.items.push(GalleryItem::from(entry));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory::MemoryFileSystem;
    use pretty_assertions::assert_eq;

    fn limits(max_depth: usize, max_results: usize) -> ScanLimits {
        ScanLimits {
            max_depth,
            max_results,
        }
    }

    fn paths(items: &[GalleryItem]) -> Vec<PathBuf> {
        let mut paths: Vec<_> = items.iter().map(|i| i.path.clone()).collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_hidden_directory_is_not_descended() {
        let fs = MemoryFileSystem::new()
            .with_file("/a/x.jpg")
            .with_file("/a/.hidden/y.jpg")
            .with_file("/a/b/z.jpg");

        let items = scan(&fs, &[PathBuf::from("/a")], Category::Image, limits(3, 10));

        assert_eq!(
            paths(&items),
            vec![PathBuf::from("/a/b/z.jpg"), PathBuf::from("/a/x.jpg")]
        );
        assert!(
            !fs.listed_paths().contains(&PathBuf::from("/a/.hidden")),
            "hidden directory must not be listed"
        );
    }

    #[test]
    fn test_hidden_files_are_skipped() {
        let fs = MemoryFileSystem::new()
            .with_file("/a/.trashed-1.jpg")
            .with_file("/a/shown.jpg");

        let items = scan(&fs, &[PathBuf::from("/a")], Category::Image, limits(3, 10));
        assert_eq!(paths(&items), vec![PathBuf::from("/a/shown.jpg")]);
    }

    #[test]
    fn test_cap_stops_whole_scan_before_next_root() {
        let fs = MemoryFileSystem::new()
            .with_file("/first/one.jpg")
            .with_file("/first/two.jpg")
            .with_file("/second/three.jpg");

        let roots = [PathBuf::from("/first"), PathBuf::from("/second")];
        let report = scan_with_report(&fs, &roots, Category::Image, limits(3, 1));

        assert_eq!(report.items.len(), 1);
        assert!(report.truncated);
        assert!(!fs.listed_paths().contains(&PathBuf::from("/second")));
    }

    #[test]
    fn test_depth_limit() {
        let fs = MemoryFileSystem::new()
            .with_file("/r/0.jpg")
            .with_file("/r/a/1.jpg")
            .with_file("/r/a/b/2.jpg")
            .with_file("/r/a/b/c/3.jpg");

        let root = [PathBuf::from("/r")];
        assert_eq!(scan(&fs, &root, Category::Image, limits(0, 10)).len(), 1);
        assert_eq!(scan(&fs, &root, Category::Image, limits(1, 10)).len(), 2);
        assert_eq!(scan(&fs, &root, Category::Image, limits(2, 10)).len(), 3);
        assert_eq!(scan(&fs, &root, Category::Image, limits(3, 10)).len(), 4);
    }

    #[test]
    fn test_missing_root_is_reported_and_skipped() {
        let fs = MemoryFileSystem::new().with_file("/present/a.mp4");
        let roots = [PathBuf::from("/absent"), PathBuf::from("/present")];

        let report = scan_with_report(&fs, &roots, Category::Video, limits(3, 10));

        assert_eq!(paths(&report.items), vec![PathBuf::from("/present/a.mp4")]);
        assert_eq!(report.issues.len(), 1);
        assert!(matches!(&report.issues[0], ScanIssue::RootMissing(p) if p == Path::new("/absent")));
        assert!(!fs.listed_paths().contains(&PathBuf::from("/absent")));
    }

    #[test]
    fn test_unreadable_directory_is_treated_as_empty() {
        let mut fs = MemoryFileSystem::new()
            .with_file("/r/locked/secret.mp3")
            .with_file("/r/open/song.mp3");
        fs.deny("/r/locked");

        let report = scan_with_report(&fs, &[PathBuf::from("/r")], Category::Audio, limits(3, 10));

        assert_eq!(paths(&report.items), vec![PathBuf::from("/r/open/song.mp3")]);
        assert!(matches!(
            &report.issues[..],
            [ScanIssue::DirectoryUnreadable { path, .. }] if path == Path::new("/r/locked")
        ));
    }

    #[test]
    fn test_unreadable_root_yields_empty_result() {
        let mut fs = MemoryFileSystem::new().with_file("/r/a.pdf");
        fs.deny("/r");
        let items = scan(&fs, &[PathBuf::from("/r")], Category::Document, limits(3, 10));
        assert!(items.is_empty());
    }

    #[test]
    fn test_only_requested_category_is_kept() {
        let fs = MemoryFileSystem::new()
            .with_file("/r/a.jpg")
            .with_file("/r/b.mp4")
            .with_file("/r/c.mp3")
            .with_file("/r/d.pdf")
            .with_file("/r/e.zip");

        for category in Category::ALL {
            let items = scan(&fs, &[PathBuf::from("/r")], category, limits(3, 10));
            assert_eq!(items.len(), 1, "{category}");
            assert_eq!(classify(&items[0].display_name), Some(category));
        }
    }

    #[test]
    fn test_overlapping_roots_do_not_duplicate() {
        let fs = MemoryFileSystem::new().with_file("/r/sub/a.jpg");
        let roots = [PathBuf::from("/r"), PathBuf::from("/r/sub")];
        let items = scan(&fs, &roots, Category::Image, limits(3, 10));
        assert_eq!(paths(&items), vec![PathBuf::from("/r/sub/a.jpg")]);
    }

    #[test]
    fn test_zero_cap_lists_nothing() {
        let fs = MemoryFileSystem::new().with_file("/r/a.jpg");
        let items = scan(&fs, &[PathBuf::from("/r")], Category::Image, limits(3, 0));
        assert!(items.is_empty());
        assert!(fs.listed_paths().is_empty());
    }

    #[test]
    fn test_display_name_is_file_name() {
        let fs = MemoryFileSystem::new().with_file("/r/IMG_0001.JPG");
        let items = scan(&fs, &[PathBuf::from("/r")], Category::Image, limits(3, 10));
        assert_eq!(items[0].display_name, "IMG_0001.JPG");
    }
}
