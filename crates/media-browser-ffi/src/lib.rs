//! UniFFI bindings for media-browser mobile apps
//!
//! The Kotlin app owns the screens and the system dialogs; everything it
//! shows comes from the objects exported here. Scans and permission
//! requests block, so the host calls them from a background dispatcher.

use media_browser_config::{Config, LaunchState};
use media_browser_engine::permissions::{
    MemoryFlagStore, Permission, PermissionError, SettingsSurface,
};
use media_browser_engine::router::{file_uri, share};
use media_browser_engine::{
    BootstrapOutcome, CapabilityTier, Category, DirectoryEntry, FlagStore, Galleries, GalleryCache,
    GalleryItem, GalleryMount, ListingStatus, LoadOutcome, NavOutcome, Navigator,
    PermissionBridge, PermissionGateway, Platform, Route, Selection, StdFileSystem, TapAction,
    route,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::UNIX_EPOCH;

uniffi::setup_scaffolding!();

const LOG_TAG: &str = "MediaBrowser";

// ============ Errors ============

/// Errors that can cross the FFI boundary
/// Note: Field is named `reason` not `message` to avoid conflict with Throwable.message in Kotlin
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FfiError {
    #[error("Config error: {reason}")]
    ConfigError { reason: String },
    #[error("Not in this gallery: {reason}")]
    UnknownItem { reason: String },
    #[error("Host error: {reason}")]
    HostError { reason: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for FfiError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        FfiError::HostError { reason: e.reason }
    }
}

// ============ Logging ============

/// Route engine logs to logcat (Android) or stderr. Safe to call repeatedly.
#[uniffi::export]
pub fn init_logging() {
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag(LOG_TAG),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .try_init();
        log::debug!("{LOG_TAG} logging ready");
    }
}

// ============ Host permissions ============

/// Settings pages the host can open
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum SettingsPage {
    AppDetails,
    AllFilesAccess,
}

impl From<SettingsSurface> for SettingsPage {
    fn from(surface: SettingsSurface) -> Self {
        match surface {
            SettingsSurface::AppDetails => SettingsPage::AppDetails,
            SettingsSurface::AllFilesAccess => SettingsPage::AllFilesAccess,
        }
    }
}

/// Implemented by the host app. Permissions are Android manifest names such
/// as `android.permission.READ_MEDIA_IMAGES`.
#[uniffi::export(with_foreign)]
pub trait PlatformPermissions: Send + Sync {
    fn check(&self, permission: String) -> bool;
    /// Show the system dialog and return the permissions the user granted
    fn request(&self, permissions: Vec<String>) -> Result<Vec<String>, FfiError>;
    fn is_available(&self, permission: String) -> bool;
    fn is_external_storage_manager(&self) -> bool;
    fn open_settings(&self, page: SettingsPage) -> bool;
}

struct HostBridge(Arc<dyn PlatformPermissions>);

impl PermissionBridge for HostBridge {
    fn check(&self, permission: Permission) -> bool {
        self.0.check(permission.as_str().to_string())
    }

    fn request(&self, permissions: &[Permission]) -> Result<Vec<Permission>, PermissionError> {
        let names = permissions.iter().map(|p| p.as_str().to_string()).collect();
        let granted = self
            .0
            .request(names)
            .map_err(|e| PermissionError::Bridge {
                reason: e.to_string(),
            })?;
        Ok(granted
            .iter()
            .filter_map(|name| Permission::from_name(name))
            .collect())
    }

    fn is_available(&self, permission: Permission) -> bool {
        self.0.is_available(permission.as_str().to_string())
    }

    fn is_external_storage_manager(&self) -> bool {
        self.0.is_external_storage_manager()
    }

    fn open_settings(&self, surface: SettingsSurface) -> bool {
        self.0.open_settings(surface.into())
    }
}

type Gateway = PermissionGateway<HostBridge>;

// ============ Enums ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum MediaCategory {
    Image,
    Video,
    Audio,
    Document,
}

impl From<Category> for MediaCategory {
    fn from(category: Category) -> Self {
        match category {
            Category::Image => MediaCategory::Image,
            Category::Video => MediaCategory::Video,
            Category::Audio => MediaCategory::Audio,
            Category::Document => MediaCategory::Document,
        }
    }
}

impl From<MediaCategory> for Category {
    fn from(category: MediaCategory) -> Self {
        match category {
            MediaCategory::Image => Category::Image,
            MediaCategory::Video => Category::Video,
            MediaCategory::Audio => Category::Audio,
            MediaCategory::Document => Category::Document,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum StorageTier {
    GranularMedia { user_selected_subset: bool },
    LegacyStorage,
    AllFilesAccess,
    Unrestricted,
}

impl From<CapabilityTier> for StorageTier {
    fn from(tier: CapabilityTier) -> Self {
        match tier {
            CapabilityTier::GranularMedia {
                user_selected_subset,
            } => StorageTier::GranularMedia {
                user_selected_subset,
            },
            CapabilityTier::LegacyStorage => StorageTier::LegacyStorage,
            CapabilityTier::AllFilesAccess => StorageTier::AllFilesAccess,
            CapabilityTier::Unrestricted => StorageTier::Unrestricted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FirstLaunch {
    AlreadyPrompted,
    Granted,
    Denied,
    RedirectedToSettings,
}

impl From<BootstrapOutcome> for FirstLaunch {
    fn from(outcome: BootstrapOutcome) -> Self {
        match outcome {
            BootstrapOutcome::AlreadyPrompted => FirstLaunch::AlreadyPrompted,
            BootstrapOutcome::Granted => FirstLaunch::Granted,
            BootstrapOutcome::Denied => FirstLaunch::Denied,
            BootstrapOutcome::RedirectedToSettings => FirstLaunch::RedirectedToSettings,
        }
    }
}

// ============ Media Browser ============

/// Process-wide entry point: resolves the tier, loads config and owns the
/// gallery cache shared by every gallery screen.
#[derive(uniffi::Object)]
pub struct MediaBrowser {
    config: Config,
    config_dir: PathBuf,
    platform: Platform,
    galleries: Arc<Galleries<StdFileSystem>>,
    gateway: Arc<Gateway>,
}

#[uniffi::export]
impl MediaBrowser {
    /// `api_level` is the Android SDK level, or `None` on hosts without a
    /// storage permission model. A missing `config.toml` in `config_dir`
    /// means platform defaults.
    #[uniffi::constructor]
    pub fn new(
        api_level: Option<u32>,
        config_dir: String,
        host: Arc<dyn PlatformPermissions>,
    ) -> Result<Self, FfiError> {
        let config_dir = PathBuf::from(config_dir);
        let config = Config::load_from_path(config_dir.join("config.toml"))
            .map_err(|e| FfiError::ConfigError {
                reason: e.to_string(),
            })?
            .unwrap_or_default();

        let platform = match api_level {
            Some(api_level) => Platform::Android { api_level },
            None => Platform::Other,
        };
        let gateway = PermissionGateway::new(HostBridge(host), CapabilityTier::resolve(platform));
        let galleries = Galleries::new(
            StdFileSystem,
            Arc::new(GalleryCache::new()),
            config.resolved_sources(),
            config.limits,
        );

        Ok(Self {
            config,
            config_dir,
            platform,
            galleries: Arc::new(galleries),
            gateway: Arc::new(gateway),
        })
    }

    pub fn storage_tier(&self) -> StorageTier {
        self.gateway.tier().into()
    }

    pub fn has_access(&self) -> bool {
        self.gateway.has_access()
    }

    /// Ask for access, escalating to settings once on denial
    pub fn ensure_access(&self) -> bool {
        self.gateway.ensure_access()
    }

    /// Show the storage prompt if this install has never shown it
    pub fn run_first_launch(&self) -> FirstLaunch {
        let state_path = self.config_dir.join("state.toml");
        let mut fallback = MemoryFlagStore::new();
        let mut state = LaunchState::open_at(&state_path);
        let store: &mut dyn FlagStore = match &mut state {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Launch state unreadable, prompting anyway: {e}");
                &mut fallback
            }
        };
        media_browser_engine::run_first_launch(self.gateway.as_ref(), self.platform, store).into()
    }

    /// Mount a gallery screen. Drop or `unmount` it when the screen goes away.
    pub fn open_gallery(&self, category: MediaCategory) -> Arc<GallerySession> {
        let mount = self.galleries.mount(category.into());
        let items = mount.cached_items();
        Arc::new(GallerySession {
            galleries: Arc::clone(&self.galleries),
            gateway: Arc::clone(&self.gateway),
            mount,
            inner: Mutex::new(SessionState {
                items,
                selection: Selection::new(),
            }),
        })
    }

    /// Start the file browser at the configured storage root
    pub fn open_browser(&self) -> Arc<FileBrowser> {
        Arc::new(FileBrowser {
            inner: Mutex::new(Navigator::new(StdFileSystem, self.config.storage_root.clone())),
        })
    }
}

// ============ Gallery Session ============

struct SessionState {
    items: Arc<[GalleryItem]>,
    selection: Selection,
}

/// One mounted gallery screen with its selection mode
#[derive(uniffi::Object)]
pub struct GallerySession {
    galleries: Arc<Galleries<StdFileSystem>>,
    gateway: Arc<Gateway>,
    mount: GalleryMount,
    inner: Mutex<SessionState>,
}

impl GallerySession {
    fn find(state: &SessionState, path: &str) -> Result<GalleryItem, FfiError> {
        state
            .items
            .iter()
            .find(|item| item.path == Path::new(path))
            .cloned()
            .ok_or_else(|| FfiError::UnknownItem {
                reason: path.to_string(),
            })
    }
}

#[uniffi::export]
impl GallerySession {
    pub fn category(&self) -> MediaCategory {
        self.mount.category().into()
    }

    /// Whether to show a spinner until `load` returns
    pub fn shows_loading(&self) -> bool {
        self.mount.shows_loading()
    }

    /// Items currently on screen
    pub fn items(&self) -> Vec<MediaItemDto> {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.items.iter().map(MediaItemDto::from_engine).collect()
    }

    /// Ensure access, rescan and refresh the screen. Blocks.
    pub fn load(&self) -> GalleryResult {
        let category = self.mount.category();
        let outcome = self.galleries.load(&self.mount, self.gateway.as_ref());
        let message = outcome.message(category);

        let status = match outcome {
            LoadOutcome::Loaded(items) => {
                let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
                state.items = items;
                GalleryStatus::Loaded
            }
            LoadOutcome::Empty => {
                let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
                state.items = Arc::from(Vec::<GalleryItem>::new());
                GalleryStatus::Empty
            }
            LoadOutcome::PermissionDenied => GalleryStatus::PermissionDenied,
            LoadOutcome::Discarded => GalleryStatus::Discarded,
        };

        GalleryResult {
            status,
            items: self.items(),
            message,
        }
    }

    /// The screen went away; an in-flight `load` will not publish
    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub fn is_selecting(&self) -> bool {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.selection.is_active()
    }

    pub fn is_selected(&self, path: String) -> bool {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.selection.set().is_selected(Path::new(&path))
    }

    pub fn selected_count(&self) -> u32 {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.selection.count() as u32
    }

    pub fn all_selected(&self) -> bool {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.selection.all_selected(&state.items)
    }

    pub fn long_press(&self, path: String) -> Result<(), FfiError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let item = Self::find(&state, &path)?;
        state.selection.long_press(&item);
        Ok(())
    }

    /// Open the item, or toggle it while selecting
    pub fn tap(&self, path: String) -> Result<TapResult, FfiError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let item = Self::find(&state, &path)?;
        Ok(match state.selection.tap(&item) {
            TapAction::Open(path) => TapResult::Open {
                route: RouteDto::from_engine(Route::Viewer(route(&path, self.mount.category()))),
            },
            TapAction::Toggled(selected) => TapResult::Toggled { selected },
        })
    }

    pub fn toggle_all(&self) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let SessionState { items, selection } = &mut *state;
        selection.toggle_all(items);
    }

    /// Back pressed. Returns `false` if selection mode was already off and
    /// the screen itself should close.
    pub fn cancel_selection(&self) -> bool {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.selection.cancel()
    }

    /// Route to the send screen with the selected items, if any
    pub fn share(&self) -> Option<RouteDto> {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        share(state.selection.set().selected_items(&state.items)).map(RouteDto::from_engine)
    }
}

// ============ File Browser ============

#[derive(uniffi::Object)]
pub struct FileBrowser {
    inner: Mutex<Navigator<StdFileSystem>>,
}

#[uniffi::export]
impl FileBrowser {
    pub fn state(&self) -> BrowserStateDto {
        let navigator = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        BrowserStateDto::from_engine(&navigator)
    }

    /// Select the entry at `index` of the current listing
    pub fn open(&self, index: u32) -> NavResult {
        let mut navigator = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let outcome = navigator.enter_index(index as usize);
        NavResult::from_engine(outcome, &navigator)
    }

    pub fn back(&self) -> NavResult {
        let mut navigator = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let outcome = navigator.back();
        NavResult::from_engine(outcome, &navigator)
    }

    pub fn refresh(&self) -> BrowserStateDto {
        let mut navigator = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        navigator.refresh();
        BrowserStateDto::from_engine(&navigator)
    }
}

// ============ DTOs ============

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct MediaItemDto {
    pub path: String,
    pub display_name: String,
    /// `file://` URI for image loaders
    pub uri: String,
}

impl MediaItemDto {
    fn from_engine(item: &GalleryItem) -> Self {
        Self {
            path: item.path.to_string_lossy().into_owned(),
            display_name: item.display_name.clone(),
            uri: file_uri(&item.path),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum GalleryStatus {
    Loaded,
    Empty,
    PermissionDenied,
    /// The session was unmounted while loading; ignore this result
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct GalleryResult {
    pub status: GalleryStatus,
    pub items: Vec<MediaItemDto>,
    /// Empty-state or error banner text
    pub message: Option<String>,
}

/// A screen to push: its name plus either a start position or a payload
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct RouteDto {
    pub screen: String,
    pub start_at: Option<String>,
    pub items: Vec<MediaItemDto>,
}

impl RouteDto {
    fn from_engine(route: Route) -> Self {
        let screen = route.screen_name().to_string();
        match route {
            Route::Viewer(target) => Self {
                screen,
                start_at: Some(target.start_at),
                items: Vec::new(),
            },
            Route::Share { images } => Self {
                screen,
                start_at: None,
                items: images.iter().map(MediaItemDto::from_engine).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum TapResult {
    Open { route: RouteDto },
    Toggled { selected: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct EntryDto {
    pub name: String,
    pub path: String,
    pub is_directory: bool,
    /// Milliseconds since the Unix epoch
    pub modified_at_ms: u64,
    pub size_bytes: Option<u64>,
    /// e.g. "3 items", directories only
    pub child_count_label: Option<String>,
    /// e.g. "3 Mar 14:05", in the device's zone
    pub modified_label: String,
}

impl EntryDto {
    fn from_engine(entry: &DirectoryEntry) -> Self {
        let modified_at_ms = entry
            .modified_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            name: entry.name.clone(),
            path: entry.absolute_path.to_string_lossy().into_owned(),
            is_directory: entry.is_directory,
            modified_at_ms,
            size_bytes: entry.size_bytes,
            child_count_label: entry.child_count_label(),
            modified_label: entry.modified_label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct BrowserStateDto {
    pub current_path: String,
    /// `None` only at the filesystem root
    pub parent_path: Option<String>,
    pub directory_name: String,
    pub entries: Vec<EntryDto>,
    pub is_empty: bool,
    pub error: Option<String>,
}

impl BrowserStateDto {
    fn from_engine(navigator: &Navigator<StdFileSystem>) -> Self {
        let state = navigator.state();
        Self {
            current_path: state.current_path.to_string_lossy().into_owned(),
            parent_path: state
                .parent_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            directory_name: navigator.current_directory_name(),
            entries: state.entries.iter().map(EntryDto::from_engine).collect(),
            is_empty: state.status == ListingStatus::Empty,
            error: match &state.status {
                ListingStatus::Failed(message) => Some(message.clone()),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum NavResult {
    Listed { state: BrowserStateDto },
    Open { route: RouteDto },
    Ignored,
    /// Back at the filesystem root; pop the browser screen
    Exit,
}

impl NavResult {
    fn from_engine(outcome: NavOutcome, navigator: &Navigator<StdFileSystem>) -> Self {
        match outcome {
            NavOutcome::Listed => NavResult::Listed {
                state: BrowserStateDto::from_engine(navigator),
            },
            NavOutcome::Open(route) => NavResult::Open {
                route: RouteDto::from_engine(route),
            },
            NavOutcome::Ignored => NavResult::Ignored,
            NavOutcome::Exit => NavResult::Exit,
        }
    }
}

// ============ Standalone Functions ============

/// Category of a file name by extension, case-insensitive
#[uniffi::export]
pub fn classify(name: String) -> Option<MediaCategory> {
    media_browser_engine::classify(&name).map(MediaCategory::from)
}

/// Viewer route for a file, or `None` when no viewer handles it
#[uniffi::export]
pub fn route_file(path: String) -> Option<RouteDto> {
    media_browser_engine::route_file(Path::new(&path)).map(RouteDto::from_engine)
}
