use crate::permissions::{Permission, PermissionBridge, PermissionError, SettingsSurface};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary storage root for filesystem tests
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a file (and its parent directories) below the test root
pub fn create_test_file(root: &TempDir, relative: &str, content: &str) -> PathBuf {
    let file_path = root.path().join(relative);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();
    file_path
}

/// Permission bridge with canned answers that records what it was asked
#[derive(Debug, Default)]
pub struct ScriptedBridge {
    checked: HashSet<Permission>,
    grant_all: bool,
    grants: HashSet<Permission>,
    fails: bool,
    unavailable: HashSet<Permission>,
    storage_manager: bool,
    requests: Mutex<Vec<Vec<Permission>>>,
    opened: Mutex<Vec<SettingsSurface>>,
}

impl ScriptedBridge {
    pub fn denying() -> Self {
        Self::default()
    }

    pub fn granting_all() -> Self {
        Self {
            grant_all: true,
            ..Self::default()
        }
    }

    pub fn granting(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            grants: permissions.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fails: true,
            ..Self::default()
        }
    }

    /// Report `permission` as already held
    pub fn with_checked(mut self, permission: Permission) -> Self {
        self.checked.insert(permission);
        self
    }

    pub fn without_available(mut self, permission: Permission) -> Self {
        self.unavailable.insert(permission);
        self
    }

    pub fn as_storage_manager(mut self) -> Self {
        self.storage_manager = true;
        self
    }

    pub fn requests(&self) -> Vec<Vec<Permission>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn opened_settings(&self) -> Vec<SettingsSurface> {
        self.opened.lock().unwrap().clone()
    }
}

impl PermissionBridge for ScriptedBridge {
    fn check(&self, permission: Permission) -> bool {
        self.checked.contains(&permission)
    }

    fn request(&self, permissions: &[Permission]) -> Result<Vec<Permission>, PermissionError> {
        self.requests.lock().unwrap().push(permissions.to_vec());
        if self.fails {
            return Err(PermissionError::Bridge {
                reason: "activity not attached".to_string(),
            });
        }
        Ok(permissions
            .iter()
            .copied()
            .filter(|p| self.grant_all || self.grants.contains(p))
            .collect())
    }

    fn is_available(&self, permission: Permission) -> bool {
        !self.unavailable.contains(&permission)
    }

    fn is_external_storage_manager(&self) -> bool {
        self.storage_manager
    }

    fn open_settings(&self, surface: SettingsSurface) -> bool {
        self.opened.lock().unwrap().push(surface);
        true
    }
}
