use super::{CapabilityTier, Permission, PermissionBridge, RequestPlan, SettingsSurface};

/// Storage access policy for one capability tier.
///
/// Denials are never fatal: callers get `false` and carry on, and scans of
/// roots the platform refuses simply come back empty.
pub struct PermissionGateway<B: PermissionBridge> {
    bridge: B,
    tier: CapabilityTier,
}

impl<B: PermissionBridge> PermissionGateway<B> {
    pub fn new(bridge: B, tier: CapabilityTier) -> Self {
        log::info!("Storage permission tier: {tier:?}");
        Self { bridge, tier }
    }

    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Whether storage can be read right now, without prompting
    pub fn has_access(&self) -> bool {
        match self.tier.request_plan() {
            RequestPlan::Nothing => true,
            RequestPlan::Settings(_) => self.bridge.is_external_storage_manager(),
            RequestPlan::Runtime { required, optional } => self
                .wanted(&required, &optional)
                .iter()
                .all(|permission| self.bridge.check(*permission)),
        }
    }

    /// Ask for access. May block on a system dialog.
    ///
    /// On the all-files tier this opens the settings page and returns `false`
    /// straight away, since the user's choice there cannot be awaited.
    pub fn request_access(&self) -> bool {
        match self.tier.request_plan() {
            RequestPlan::Nothing => true,
            RequestPlan::Settings(_) => {
                if self.bridge.is_external_storage_manager() {
                    return true;
                }
                self.escalate_to_settings();
                false
            }
            RequestPlan::Runtime { required, optional } => self.request_runtime(&required, &optional),
        }
    }

    /// Open the settings page for this tier. Returns whether it opened.
    pub fn escalate_to_settings(&self) -> bool {
        match self.tier.settings_surface() {
            Some(surface) => self.open_settings(surface),
            None => false,
        }
    }

    /// Open a specific settings page. Returns whether it opened.
    pub fn open_settings(&self, surface: SettingsSurface) -> bool {
        log::info!("Opening {surface:?} settings for storage access");
        let opened = self.bridge.open_settings(surface);
        if !opened {
            log::warn!("Could not open {surface:?} settings");
        }
        opened
    }

    /// Request access and escalate to settings once if it is refused.
    pub fn ensure_access(&self) -> bool {
        if self.request_access() {
            return true;
        }
        // The settings tier already redirected inside request_access
        if matches!(self.tier.request_plan(), RequestPlan::Runtime { .. }) {
            self.escalate_to_settings();
        }
        false
    }

    /// `required` plus whichever `optional` permissions the host offers
    fn wanted(&self, required: &[Permission], optional: &[Permission]) -> Vec<Permission> {
        let mut wanted = required.to_vec();
        wanted.extend(
            optional
                .iter()
                .copied()
                .filter(|permission| self.bridge.is_available(*permission)),
        );
        wanted
    }

    fn request_runtime(&self, required: &[Permission], optional: &[Permission]) -> bool {
        let wanted = self.wanted(required, optional);
        if wanted.iter().all(|permission| self.bridge.check(*permission)) {
            return true;
        }

        match self.bridge.request(&wanted) {
            Ok(granted) => {
                let all_granted = wanted.iter().all(|permission| granted.contains(permission));
                log::info!(
                    "Storage permission request: {} of {} granted",
                    granted.len(),
                    wanted.len()
                );
                all_granted
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::NoPermissionModel;
    use crate::tests::ScriptedBridge;

    #[test]
    fn test_legacy_denial_escalates_once() {
        let bridge = ScriptedBridge::denying();
        let gateway = PermissionGateway::new(&bridge, CapabilityTier::LegacyStorage);

        assert!(!gateway.request_access());
        assert!(bridge.opened_settings().is_empty());

        assert!(!gateway.ensure_access());
        assert_eq!(bridge.opened_settings(), vec![SettingsSurface::AppDetails]);
    }

    #[test]
    fn test_legacy_already_granted_does_not_prompt() {
        let bridge = ScriptedBridge::granting_all().with_checked(Permission::ReadExternalStorage);
        let gateway = PermissionGateway::new(&bridge, CapabilityTier::LegacyStorage);

        assert!(gateway.has_access());
        assert!(gateway.ensure_access());
        assert!(bridge.requests().is_empty());
    }

    #[test]
    fn test_granular_requires_every_media_permission() {
        let bridge = ScriptedBridge::granting([Permission::ReadMediaImages, Permission::ReadMediaVideo]);
        let gateway = PermissionGateway::new(
            &bridge,
            CapabilityTier::GranularMedia {
                user_selected_subset: false,
            },
        );

        assert!(!gateway.request_access());
        assert_eq!(
            bridge.requests(),
            vec![vec![
                Permission::ReadMediaImages,
                Permission::ReadMediaVideo,
                Permission::ReadMediaAudio,
            ]]
        );
    }

    #[test]
    fn test_granular_includes_offered_user_selected_permissions() {
        let bridge = ScriptedBridge::granting_all()
            .without_available(Permission::ReadMediaAudioUserSelected);
        let gateway = PermissionGateway::new(
            &bridge,
            CapabilityTier::GranularMedia {
                user_selected_subset: true,
            },
        );

        assert!(gateway.request_access());
        let requested = &bridge.requests()[0];
        assert!(requested.contains(&Permission::ReadMediaVisualUserSelected));
        assert!(!requested.contains(&Permission::ReadMediaAudioUserSelected));
    }

    #[test]
    fn test_granular_denied_user_selected_subset_is_failure() {
        let bridge = ScriptedBridge::granting([
            Permission::ReadMediaImages,
            Permission::ReadMediaVideo,
            Permission::ReadMediaAudio,
        ]);
        let gateway = PermissionGateway::new(
            &bridge,
            CapabilityTier::GranularMedia {
                user_selected_subset: true,
            },
        );

        assert!(!gateway.request_access());
        assert_eq!(
            bridge.requests(),
            vec![vec![
                Permission::ReadMediaImages,
                Permission::ReadMediaVideo,
                Permission::ReadMediaAudio,
                Permission::ReadMediaVisualUserSelected,
                Permission::ReadMediaAudioUserSelected,
            ]]
        );
        assert!(!gateway.ensure_access());
        assert_eq!(bridge.opened_settings(), vec![SettingsSurface::AppDetails]);
    }

    #[test]
    fn test_granular_access_check_covers_offered_subset() {
        let bridge = ScriptedBridge::denying()
            .with_checked(Permission::ReadMediaImages)
            .with_checked(Permission::ReadMediaVideo)
            .with_checked(Permission::ReadMediaAudio)
            .without_available(Permission::ReadMediaAudioUserSelected);
        let gateway = PermissionGateway::new(
            &bridge,
            CapabilityTier::GranularMedia {
                user_selected_subset: true,
            },
        );
        assert!(!gateway.has_access());

        let without_subset = PermissionGateway::new(
            &bridge,
            CapabilityTier::GranularMedia {
                user_selected_subset: false,
            },
        );
        assert!(without_subset.has_access());
    }

    #[test]
    fn test_all_files_redirects_without_waiting() {
        let bridge = ScriptedBridge::denying();
        let gateway = PermissionGateway::new(&bridge, CapabilityTier::AllFilesAccess);

        assert!(!gateway.has_access());
        assert!(!gateway.ensure_access());
        assert_eq!(bridge.opened_settings(), vec![SettingsSurface::AllFilesAccess]);
        assert!(bridge.requests().is_empty());
    }

    #[test]
    fn test_all_files_manager_has_access() {
        let bridge = ScriptedBridge::denying().as_storage_manager();
        let gateway = PermissionGateway::new(&bridge, CapabilityTier::AllFilesAccess);
        assert!(gateway.has_access());
        assert!(gateway.ensure_access());
        assert!(bridge.opened_settings().is_empty());
    }

    #[test]
    fn test_bridge_failure_counts_as_denial() {
        let bridge = ScriptedBridge::failing();
        let gateway = PermissionGateway::new(&bridge, CapabilityTier::LegacyStorage);
        assert!(!gateway.ensure_access());
        assert_eq!(bridge.opened_settings().len(), 1);
    }

    #[test]
    fn test_unrestricted_never_prompts() {
        let gateway = PermissionGateway::new(NoPermissionModel, CapabilityTier::Unrestricted);
        assert!(gateway.has_access());
        assert!(gateway.ensure_access());
        assert!(!gateway.escalate_to_settings());
    }
}
