//! Type-specific galleries: where to look, and the mount/load cycle that
//! keeps the shared cache and the on-screen state in step.
//!
//! A mount starts from whatever the cache holds (so a revisit renders
//! instantly), then a load rescans and replaces it. A load that finishes
//! after its screen went away is dropped without touching the cache.

use crate::cache::GalleryCache;
use crate::classify::Category;
use crate::io::FileSystem;
use crate::models::GalleryItem;
use crate::permissions::{PermissionBridge, PermissionGateway};
use crate::scanner::{ScanLimits, ScanReport, scan_with_report};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const ANDROID_STORAGE_ROOT: &str = "/storage/emulated/0";

/// Roots searched per category, in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySources {
    pub image: Vec<PathBuf>,
    pub video: Vec<PathBuf>,
    pub audio: Vec<PathBuf>,
    pub document: Vec<PathBuf>,
}

impl Default for GallerySources {
    fn default() -> Self {
        Self::android()
    }
}

impl GallerySources {
    /// The usual camera, download and messenger folders on Android
    pub fn android() -> Self {
        let under_root = |dirs: &[&str]| -> Vec<PathBuf> {
            dirs.iter()
                .map(|dir| PathBuf::from(ANDROID_STORAGE_ROOT).join(dir))
                .collect()
        };
        Self {
            image: under_root(&[
                "DCIM",
                "Pictures",
                "Download",
                "WhatsApp/Media/WhatsApp Images",
                "Telegram/Telegram Images",
            ]),
            video: under_root(&[
                "DCIM",
                "Movies",
                "Download",
                "WhatsApp/Media/WhatsApp Video",
                "Telegram/Telegram Video",
            ]),
            audio: under_root(&[
                "Music",
                "Recordings",
                "Download",
                "WhatsApp/Media/WhatsApp Audio",
                "Telegram/Telegram Audio",
            ]),
            document: under_root(&[
                "Documents",
                "Download",
                "WhatsApp/Media/WhatsApp Documents",
                "Telegram/Telegram Documents",
            ]),
        }
    }

    /// Every category searches the same single root
    pub fn single_root(root: impl Into<PathBuf>) -> Self {
        let root = vec![root.into()];
        Self {
            image: root.clone(),
            video: root.clone(),
            audio: root.clone(),
            document: root,
        }
    }

    pub fn roots(&self, category: Category) -> &[PathBuf] {
        match category {
            Category::Image => &self.image,
            Category::Video => &self.video,
            Category::Audio => &self.audio,
            Category::Document => &self.document,
        }
    }

    pub fn roots_mut(&mut self, category: Category) -> &mut Vec<PathBuf> {
        match category {
            Category::Image => &mut self.image,
            Category::Video => &mut self.video,
            Category::Audio => &mut self.audio,
            Category::Document => &mut self.document,
        }
    }
}

/// One appearance of a gallery screen.
///
/// Cloning shares the "still mounted" flag, so a background load can hold a
/// clone while the screen unmounts the original.
#[derive(Debug, Clone)]
pub struct GalleryMount {
    category: Category,
    active: Arc<AtomicBool>,
    cached: Arc<[GalleryItem]>,
}

impl GalleryMount {
    pub fn category(&self) -> Category {
        self.category
    }

    /// Cache contents at mount time, shown until the load completes
    pub fn cached_items(&self) -> Arc<[GalleryItem]> {
        Arc::clone(&self.cached)
    }

    /// A loading indicator is only needed when there is nothing cached
    pub fn shows_loading(&self) -> bool {
        self.cached.is_empty()
    }

    pub fn is_current(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn unmount(&self) {
        self.active.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(Arc<[GalleryItem]>),
    /// Scan finished with nothing to show
    Empty,
    /// Access was refused; the user has been sent to settings
    PermissionDenied,
    /// The screen unmounted before the scan finished
    Discarded,
}

impl LoadOutcome {
    /// Text for the error banner or empty state, if any
    pub fn message(&self, category: Category) -> Option<String> {
        match self {
            LoadOutcome::Loaded(_) | LoadOutcome::Discarded => None,
            LoadOutcome::Empty => Some(format!("No {} found", plural_noun(category))),
            LoadOutcome::PermissionDenied => Some(format!(
                "Storage permission denied. Please grant access to view {}.",
                plural_noun(category)
            )),
        }
    }
}

pub fn plural_noun(category: Category) -> &'static str {
    match category {
        Category::Image => "images",
        Category::Video => "videos",
        Category::Audio => "audio files",
        Category::Document => "documents",
    }
}

/// Gallery scanning wired to a filesystem and the shared cache
pub struct Galleries<F: FileSystem> {
    fs: F,
    cache: Arc<GalleryCache>,
    sources: GallerySources,
    limits: ScanLimits,
}

impl<F: FileSystem> Galleries<F> {
    pub fn new(fs: F, cache: Arc<GalleryCache>, sources: GallerySources, limits: ScanLimits) -> Self {
        Self {
            fs,
            cache,
            sources,
            limits,
        }
    }

    pub fn cache(&self) -> &Arc<GalleryCache> {
        &self.cache
    }

    pub fn sources(&self) -> &GallerySources {
        &self.sources
    }

    pub fn limits(&self) -> ScanLimits {
        self.limits
    }

    pub fn mount(&self, category: Category) -> GalleryMount {
        GalleryMount {
            category,
            active: Arc::new(AtomicBool::new(true)),
            cached: self.cache.read(category),
        }
    }

    /// Scan the configured roots without touching permissions or the cache
    pub fn scan(&self, category: Category) -> ScanReport {
        scan_with_report(&self.fs, self.sources.roots(category), category, self.limits)
    }

    /// Ensure access, rescan, and publish the result if `mount` is still current.
    ///
    /// Blocks for the duration of the scan.
    pub fn load<B: PermissionBridge>(
        &self,
        mount: &GalleryMount,
        gateway: &PermissionGateway<B>,
    ) -> LoadOutcome {
        let category = mount.category();

        if !gateway.ensure_access() {
            if !mount.is_current() {
                return LoadOutcome::Discarded;
            }
            return LoadOutcome::PermissionDenied;
        }

        let report = self.scan(category);
        if !mount.is_current() {
            log::debug!("Discarding {category} scan for unmounted gallery");
            return LoadOutcome::Discarded;
        }

        let found = report.items.len();
        self.cache.write(category, report.items);
        if found == 0 {
            LoadOutcome::Empty
        } else {
            LoadOutcome::Loaded(self.cache.read(category))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::memory::MemoryFileSystem;
    use crate::permissions::{CapabilityTier, NoPermissionModel, Permission, Platform};
    use crate::tests::ScriptedBridge;

    fn galleries(fs: MemoryFileSystem) -> Galleries<MemoryFileSystem> {
        Galleries::new(
            fs,
            Arc::new(GalleryCache::new()),
            GallerySources::single_root("/sd"),
            ScanLimits::default(),
        )
    }

    fn open_gateway() -> PermissionGateway<NoPermissionModel> {
        PermissionGateway::new(NoPermissionModel, CapabilityTier::Unrestricted)
    }

    #[test]
    fn test_first_mount_shows_loading_then_fills_cache() {
        let galleries = galleries(MemoryFileSystem::new().with_file("/sd/a.jpg"));
        let mount = galleries.mount(Category::Image);
        assert!(mount.shows_loading());

        let outcome = galleries.load(&mount, &open_gateway());
        assert!(matches!(&outcome, LoadOutcome::Loaded(items) if items.len() == 1));
        assert_eq!(galleries.cache().read(Category::Image).len(), 1);
    }

    #[test]
    fn test_remount_starts_from_cache() {
        let galleries = galleries(MemoryFileSystem::new().with_file("/sd/a.jpg"));
        let first = galleries.mount(Category::Image);
        galleries.load(&first, &open_gateway());
        first.unmount();

        let second = galleries.mount(Category::Image);
        assert!(!second.shows_loading());
        assert_eq!(second.cached_items()[0].path, PathBuf::from("/sd/a.jpg"));
    }

    #[test]
    fn test_unmounted_load_is_discarded() {
        let galleries = galleries(MemoryFileSystem::new().with_file("/sd/a.jpg"));
        let mount = galleries.mount(Category::Image);
        let in_flight = mount.clone();
        mount.unmount();

        assert_eq!(galleries.load(&in_flight, &open_gateway()), LoadOutcome::Discarded);
        assert!(galleries.cache().read(Category::Image).is_empty());
    }

    #[test]
    fn test_empty_scan_overwrites_stale_cache() {
        let galleries = galleries(MemoryFileSystem::new().with_dir("/sd"));
        galleries
            .cache()
            .write(Category::Video, vec![GalleryItem::new("/sd/old.mp4", "old.mp4")]);

        let mount = galleries.mount(Category::Video);
        assert!(!mount.shows_loading());
        let outcome = galleries.load(&mount, &open_gateway());

        assert_eq!(outcome, LoadOutcome::Empty);
        assert_eq!(outcome.message(Category::Video).as_deref(), Some("No videos found"));
        assert!(galleries.cache().read(Category::Video).is_empty());
    }

    #[test]
    fn test_denied_permission_skips_scan_and_keeps_cache() {
        let fs = MemoryFileSystem::new().with_file("/sd/a.jpg");
        let galleries = galleries(fs);
        galleries
            .cache()
            .write(Category::Image, vec![GalleryItem::new("/sd/old.jpg", "old.jpg")]);

        let bridge = ScriptedBridge::denying();
        let gateway = PermissionGateway::new(&bridge, CapabilityTier::LegacyStorage);
        let mount = galleries.mount(Category::Image);

        let outcome = galleries.load(&mount, &gateway);
        assert_eq!(outcome, LoadOutcome::PermissionDenied);
        assert!(outcome.message(Category::Image).unwrap().contains("view images"));
        assert_eq!(bridge.opened_settings().len(), 1);
        assert_eq!(galleries.cache().read(Category::Image).len(), 1);
    }

    #[test]
    fn test_api_31_gallery_asks_for_legacy_read_permission() {
        let galleries = galleries(MemoryFileSystem::new().with_file("/sd/a.jpg"));
        let bridge = ScriptedBridge::granting([Permission::ReadExternalStorage]);
        let tier = CapabilityTier::resolve(Platform::Android { api_level: 31 });
        let gateway = PermissionGateway::new(&bridge, tier);

        let outcome = galleries.load(&galleries.mount(Category::Image), &gateway);

        assert!(matches!(&outcome, LoadOutcome::Loaded(items) if items.len() == 1));
        assert_eq!(bridge.requests(), vec![vec![Permission::ReadExternalStorage]]);
        assert!(bridge.opened_settings().is_empty());
    }

    #[test]
    fn test_android_sources_cover_every_category() {
        let sources = GallerySources::android();
        for category in Category::ALL {
            let roots = sources.roots(category);
            assert!(!roots.is_empty());
            assert!(roots.iter().all(|r| r.starts_with(ANDROID_STORAGE_ROOT)));
        }
        assert_eq!(
            sources.image[0],
            PathBuf::from("/storage/emulated/0/DCIM")
        );
    }
}
