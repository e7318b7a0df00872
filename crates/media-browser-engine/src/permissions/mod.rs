//! Storage permission handling.
//!
//! The host platform is reached through [`PermissionBridge`]; the engine
//! decides *what* to ask for from the capability tier resolved at startup.

pub mod bootstrap;
pub mod gateway;
pub mod tier;

pub use bootstrap::{BootstrapOutcome, FlagStore, MemoryFlagStore, PROMPT_SHOWN_KEY, run_first_launch};
pub use gateway::PermissionGateway;
pub use tier::{CapabilityTier, Platform, RequestPlan};

/// Runtime permissions the engine may ask the host for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ReadMediaImages,
    ReadMediaVideo,
    ReadMediaAudio,
    ReadMediaVisualUserSelected,
    ReadMediaAudioUserSelected,
    ReadExternalStorage,
}

impl Permission {
    /// Android manifest name
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::ReadMediaImages => "android.permission.READ_MEDIA_IMAGES",
            Permission::ReadMediaVideo => "android.permission.READ_MEDIA_VIDEO",
            Permission::ReadMediaAudio => "android.permission.READ_MEDIA_AUDIO",
            Permission::ReadMediaVisualUserSelected => {
                "android.permission.READ_MEDIA_VISUAL_USER_SELECTED"
            }
            Permission::ReadMediaAudioUserSelected => {
                "android.permission.READ_MEDIA_AUDIO_USER_SELECTED"
            }
            Permission::ReadExternalStorage => "android.permission.READ_EXTERNAL_STORAGE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Permission::ReadMediaImages,
            Permission::ReadMediaVideo,
            Permission::ReadMediaAudio,
            Permission::ReadMediaVisualUserSelected,
            Permission::ReadMediaAudioUserSelected,
            Permission::ReadExternalStorage,
        ]
        .into_iter()
        .find(|p| p.as_str() == name)
    }
}

/// Settings pages the host can open when in-app requests are not enough
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSurface {
    /// The app's details page, where runtime permissions can be toggled
    AppDetails,
    /// The dedicated "All files access" page
    AllFilesAccess,
}

#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    #[error("Storage permission request failed: {reason}")]
    Bridge { reason: String },
}

/// Host-side permission capabilities.
///
/// `request` may block until the user answers a system dialog, so callers
/// run it off the UI thread.
pub trait PermissionBridge: Send + Sync {
    fn check(&self, permission: Permission) -> bool;
    /// Ask for `permissions`, returning the ones the user granted
    fn request(&self, permissions: &[Permission]) -> Result<Vec<Permission>, PermissionError>;
    /// Whether the platform knows this permission at all
    fn is_available(&self, permission: Permission) -> bool;
    fn is_external_storage_manager(&self) -> bool;
    /// Open a settings page. Returns `false` when it could not be opened.
    fn open_settings(&self, surface: SettingsSurface) -> bool;
}

impl<T: PermissionBridge + ?Sized> PermissionBridge for &T {
    fn check(&self, permission: Permission) -> bool {
        (**self).check(permission)
    }

    fn request(&self, permissions: &[Permission]) -> Result<Vec<Permission>, PermissionError> {
        (**self).request(permissions)
    }

    fn is_available(&self, permission: Permission) -> bool {
        (**self).is_available(permission)
    }

    fn is_external_storage_manager(&self) -> bool {
        (**self).is_external_storage_manager()
    }

    fn open_settings(&self, surface: SettingsSurface) -> bool {
        (**self).open_settings(surface)
    }
}

impl<T: PermissionBridge + ?Sized> PermissionBridge for std::sync::Arc<T> {
    fn check(&self, permission: Permission) -> bool {
        (**self).check(permission)
    }

    fn request(&self, permissions: &[Permission]) -> Result<Vec<Permission>, PermissionError> {
        (**self).request(permissions)
    }

    fn is_available(&self, permission: Permission) -> bool {
        (**self).is_available(permission)
    }

    fn is_external_storage_manager(&self) -> bool {
        (**self).is_external_storage_manager()
    }

    fn open_settings(&self, surface: SettingsSurface) -> bool {
        (**self).open_settings(surface)
    }
}

/// Bridge for hosts without a permission model (desktop, tests). Everything
/// is granted and nothing needs settings.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPermissionModel;

impl PermissionBridge for NoPermissionModel {
    fn check(&self, _permission: Permission) -> bool {
        true
    }

    fn request(&self, permissions: &[Permission]) -> Result<Vec<Permission>, PermissionError> {
        Ok(permissions.to_vec())
    }

    fn is_available(&self, _permission: Permission) -> bool {
        true
    }

    fn is_external_storage_manager(&self) -> bool {
        true
    }

    fn open_settings(&self, _surface: SettingsSurface) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_names_round_trip() {
        let name = Permission::ReadMediaVideo.as_str();
        assert_eq!(Permission::from_name(name), Some(Permission::ReadMediaVideo));
        assert_eq!(Permission::from_name("android.permission.CAMERA"), None);
    }
}
