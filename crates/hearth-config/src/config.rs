use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{ConfigError, Result},
    repository::RepositoryEntry,
};

const DEFAULT_DATA_PATH: &str = "/data";

/// The supervisor's persisted configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Supervisor data directory.
    /// Default: /data
    pub data_path: Option<String>,

    /// Custom addon repositories registered by the user.
    #[serde(default)]
    pub addon_repositories: Vec<RepositoryEntry>,
}

impl Config {
    pub fn get_data_path(&self) -> PathBuf {
        if let Ok(env_path) = std::env::var("HEARTH_DATA") {
            return PathBuf::from(env_path);
        }
        self.data_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
    }

    /// Root of all addon repository mirrors.
    pub fn get_addons_path(&self) -> PathBuf {
        self.get_data_path().join("addons")
    }

    /// Root of the user-registered repository mirrors.
    pub fn get_addons_custom_path(&self) -> PathBuf {
        self.get_addons_path().join("custom")
    }
}

/// Shared access to the configuration file.
///
/// Registrations are written to disk before the mutating call returns, so
/// they survive a supervisor restart that happens right after.
pub struct ConfigStore {
    path: PathBuf,
    config: RwLock<Config>,
}

impl ConfigStore {
    /// Loads the configuration from `path`. A missing file yields defaults.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        Ok(Self {
            path,
            config: RwLock::new(config),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Config {
        self.config.read().unwrap().clone()
    }

    pub fn addon_repositories(&self) -> Vec<RepositoryEntry> {
        self.config.read().unwrap().addon_repositories.clone()
    }

    /// Durably registers a custom repository mapping.
    pub fn add_addon_repository(&self, url: &str, slug: &str) -> Result<()> {
        let mut config = self.config.write().unwrap();
        if config.addon_repositories.iter().any(|entry| entry.url == url) {
            return Err(ConfigError::RepositoryAlreadyRegistered(url.to_string()));
        }
        config
            .addon_repositories
            .push(RepositoryEntry::new(url, slug));
        self.persist(&config)
    }

    /// Durably drops a custom repository mapping.
    ///
    /// Unknown URLs succeed, so removal flows can always deregister.
    pub fn drop_addon_repository(&self, url: &str) -> Result<()> {
        let mut config = self.config.write().unwrap();
        let before = config.addon_repositories.len();
        config.addon_repositories.retain(|entry| entry.url != url);
        if config.addon_repositories.len() == before {
            debug!("No registered repository for {url}");
            return Ok(());
        }
        self.persist(&config)
    }

    fn persist(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            hearth_utils::fs::ensure_dir_exists(parent)?;
        }
        let serialized = toml::to_string_pretty(config)?;
        fs::write(&self.path, serialized)?;
        info!("Configuration saved to {}", self.path.display());
        Ok(())
    }
}
