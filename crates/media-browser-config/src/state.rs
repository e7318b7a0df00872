use crate::{Config, ConfigError};
use media_browser_engine::FlagStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Flags that must survive restarts, such as whether the first-launch
/// storage prompt has run. Every write goes straight to disk.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LaunchState {
    #[serde(default)]
    flags: BTreeMap<String, bool>,
    #[serde(skip)]
    path: PathBuf,
}

impl LaunchState {
    pub fn state_path() -> PathBuf {
        Config::config_dir().join("state.toml")
    }

    pub fn open() -> Result<Self, ConfigError> {
        Self::open_at(Self::state_path())
    }

    /// Load flags from `path`; a missing file starts empty
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                flags: BTreeMap::new(),
                path,
            });
        }

        let content =
            std::fs::read_to_string(&path).map_err(|source| ConfigError::ConfigReadError {
                config_path: path.clone(),
                source,
            })?;
        let mut state: LaunchState =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: path.clone(),
                source,
            })?;
        state.path = path;
        Ok(state)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

impl FlagStore for LaunchState {
    fn get_flag(&self, key: &str) -> anyhow::Result<Option<bool>> {
        Ok(self.flags.get(key).copied())
    }

    fn set_flag(&mut self, key: &str, value: bool) -> anyhow::Result<()> {
        self.flags.insert(key.to_string(), value);
        self.save()
    }
}
