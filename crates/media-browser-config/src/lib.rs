use media_browser_engine::gallery::ANDROID_STORAGE_ROOT;
use media_browser_engine::{Category, GallerySources, ScanLimits};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod state;

pub use state::LaunchState;

const CONFIG_DIR: &str = "~/.config/media-browser";
const GLOB_CHARS: &[char] = &['*', '?', '['];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Where the file browser starts
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,
    #[serde(default)]
    pub limits: ScanLimits,
    /// Gallery roots per category. Entries may use `~`, `$VAR` and glob
    /// patterns such as `/storage/*/DCIM`.
    #[serde(default)]
    pub sources: GallerySources,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from(ANDROID_STORAGE_ROOT)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: default_storage_root(),
            limits: ScanLimits::default(),
            sources: GallerySources::default(),
        }
    }
}

impl Config {
    /// Config whose browser and galleries all start from one directory
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            sources: GallerySources::single_root(root.clone()),
            storage_root: root,
            limits: ScanLimits::default(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the storage root
        config.storage_root = Self::expand_path(&config.storage_root).unwrap_or(config.storage_root);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_dir() -> PathBuf {
        let config_dir = shellexpand::tilde(CONFIG_DIR);
        PathBuf::from(config_dir.as_ref())
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Gallery roots with variables expanded and glob patterns resolved to
    /// the directories they currently match. Order is preserved: a pattern's
    /// matches take the pattern's place, sorted by path.
    pub fn resolved_sources(&self) -> GallerySources {
        let mut resolved = self.sources.clone();
        for category in Category::ALL {
            let roots = resolved.roots_mut(category);
            *roots = roots.iter().flat_map(|root| Self::resolve_root(root)).collect();
        }
        resolved
    }

    fn resolve_root(root: &Path) -> Vec<PathBuf> {
        let expanded = Self::expand_path(root).unwrap_or_else(|| root.to_path_buf());
        let pattern = expanded.to_string_lossy();
        if !pattern.contains(GLOB_CHARS) {
            return vec![expanded];
        }

        match glob::glob(&pattern) {
            Ok(paths) => {
                let mut matches: Vec<PathBuf> = paths
                    .filter_map(|entry| match entry {
                        Ok(path) => Some(path),
                        Err(e) => {
                            log::debug!("Skipping unreadable glob match: {e}");
                            None
                        }
                    })
                    .filter(|path| path.is_dir())
                    .collect();
                matches.sort();
                matches
            }
            Err(e) => {
                log::warn!("Invalid root pattern {pattern}: {e}");
                vec![expanded]
            }
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
