//! One-time storage prompt on first launch.

use super::{PermissionBridge, PermissionGateway, Platform, RequestPlan};
use std::collections::HashMap;

pub const PROMPT_SHOWN_KEY: &str = "first_launch_storage_prompt_shown";

/// Persistent boolean flags, e.g. the host's key-value preferences.
pub trait FlagStore {
    fn get_flag(&self, key: &str) -> anyhow::Result<Option<bool>>;
    fn set_flag(&mut self, key: &str, value: bool) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryFlagStore {
    flags: HashMap<String, bool>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn get_flag(&self, key: &str) -> anyhow::Result<Option<bool>> {
        Ok(self.flags.get(key).copied())
    }

    fn set_flag(&mut self, key: &str, value: bool) -> anyhow::Result<()> {
        self.flags.insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The prompt ran on an earlier launch; nothing was asked
    AlreadyPrompted,
    Granted,
    /// Denied; the user was sent to settings
    Denied,
    /// Access needs the settings page, which was opened
    RedirectedToSettings,
}

/// Run the storage prompt if it has never run, then record that it did.
///
/// The prompt follows [`Platform::first_launch_plan`], so from API 30 on it
/// opens the all-files page unless the app already manages storage.
///
/// Failures are logged and otherwise ignored. An unreadable flag store means
/// the prompt runs again, which is the safer side to err on.
pub fn run_first_launch<B: PermissionBridge>(
    gateway: &PermissionGateway<B>,
    platform: Platform,
    store: &mut dyn FlagStore,
) -> BootstrapOutcome {
    match store.get_flag(PROMPT_SHOWN_KEY) {
        Ok(Some(_)) => {
            log::debug!("Storage prompt already shown on an earlier launch");
            return BootstrapOutcome::AlreadyPrompted;
        }
        Ok(None) => {}
        Err(e) => log::warn!("Could not read launch state, prompting anyway: {e:#}"),
    }

    let outcome = match platform.first_launch_plan() {
        RequestPlan::Nothing => BootstrapOutcome::Granted,
        RequestPlan::Settings(surface) => {
            if gateway.bridge().is_external_storage_manager() {
                BootstrapOutcome::Granted
            } else {
                gateway.open_settings(surface);
                BootstrapOutcome::RedirectedToSettings
            }
        }
        RequestPlan::Runtime { .. } => {
            if gateway.ensure_access() {
                BootstrapOutcome::Granted
            } else {
                BootstrapOutcome::Denied
            }
        }
    };
    log::info!("First-launch storage prompt finished: {outcome:?}");

    if let Err(e) = store.set_flag(PROMPT_SHOWN_KEY, true) {
        log::warn!("Could not record first-launch prompt: {e:#}");
    }
    outcome
}
