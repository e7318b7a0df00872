use super::{Permission, SettingsSurface};

/// First Android API level with per-media read permissions
pub const GRANULAR_MEDIA_API: u32 = 33;
/// First Android API level offering "user-selected" partial media access
pub const USER_SELECTED_API: u32 = 35;
/// First Android API level with the "All files access" settings page
pub const ALL_FILES_API: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android { api_level: u32 },
    Other,
}

/// Named platform capability level, resolved once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityTier {
    /// Separate image, video and audio read permissions
    GranularMedia { user_selected_subset: bool },
    /// One combined read-storage permission
    LegacyStorage,
    /// Only grantable from the dedicated settings page
    AllFilesAccess,
    /// Host has no storage permission model
    Unrestricted,
}

/// What to ask the host for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPlan {
    Nothing,
    /// In-app runtime request for `required` plus each `optional` permission
    /// the host offers. Every permission asked for must be granted.
    Runtime {
        required: Vec<Permission>,
        optional: Vec<Permission>,
    },
    /// Redirect to a settings page; the outcome is not observable
    Settings(SettingsSurface),
}

impl Platform {
    /// Plan for the one-time prompt on first launch. From API 30 on this
    /// sends the user to the all-files page, whichever tier the galleries use.
    pub fn first_launch_plan(self) -> RequestPlan {
        match self {
            Platform::Android { api_level } if api_level >= ALL_FILES_API => {
                RequestPlan::Settings(SettingsSurface::AllFilesAccess)
            }
            _ => CapabilityTier::resolve(self).request_plan(),
        }
    }
}

impl CapabilityTier {
    /// Tier used by gallery loads. Below API 33 that is the combined legacy
    /// read permission; the all-files tier is never picked here.
    pub fn resolve(platform: Platform) -> Self {
        match platform {
            Platform::Other => CapabilityTier::Unrestricted,
            Platform::Android { api_level } if api_level >= GRANULAR_MEDIA_API => {
                CapabilityTier::GranularMedia {
                    user_selected_subset: api_level >= USER_SELECTED_API,
                }
            }
            Platform::Android { .. } => CapabilityTier::LegacyStorage,
        }
    }

    pub fn request_plan(self) -> RequestPlan {
        match self {
            CapabilityTier::GranularMedia {
                user_selected_subset,
            } => RequestPlan::Runtime {
                required: vec![
                    Permission::ReadMediaImages,
                    Permission::ReadMediaVideo,
                    Permission::ReadMediaAudio,
                ],
                optional: if user_selected_subset {
                    vec![
                        Permission::ReadMediaVisualUserSelected,
                        Permission::ReadMediaAudioUserSelected,
                    ]
                } else {
                    Vec::new()
                },
            },
            CapabilityTier::LegacyStorage => RequestPlan::Runtime {
                required: vec![Permission::ReadExternalStorage],
                optional: Vec::new(),
            },
            CapabilityTier::AllFilesAccess => RequestPlan::Settings(SettingsSurface::AllFilesAccess),
            CapabilityTier::Unrestricted => RequestPlan::Nothing,
        }
    }

    /// Where to send the user after a denial
    pub fn settings_surface(self) -> Option<SettingsSurface> {
        match self {
            CapabilityTier::GranularMedia { .. } | CapabilityTier::LegacyStorage => {
                Some(SettingsSurface::AppDetails)
            }
            CapabilityTier::AllFilesAccess => Some(SettingsSurface::AllFilesAccess),
            CapabilityTier::Unrestricted => None,
        }
    }
}
