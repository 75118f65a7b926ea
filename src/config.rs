//! Configuration loading and management
//!
//! Handles parsing of `.tt.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = ".tt.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
        }
    }
}

/// Storage-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data file holding all tracked entities
    #[serde(default = "default_file")]
    pub file: PathBuf,

    /// How long to wait for the data file lock, in milliseconds
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_file() -> PathBuf {
    PathBuf::from("tracker.csv")
}

fn default_lock_timeout_ms() -> u64 {
    crate::lock::DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file: default_file(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl Config {
    /// Parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Load `.tt.toml` from `dir`, falling back to defaults when the file is
    /// absent or unreadable.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("ignoring invalid {}: {err}", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_when_file_absent() {
        let dir = tempdir().expect("tempdir");
        let config = Config::load_from_dir(dir.path());
        assert_eq!(config.storage.file, PathBuf::from("tracker.csv"));
        assert_eq!(config.storage.lock_timeout_ms, 5000);
    }

    #[test]
    fn parses_partial_overrides() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[storage]\nfile = \"work/items.csv\"\n",
        )
        .expect("write config");

        let config = Config::load_from_dir(dir.path());
        assert_eq!(config.storage.file, PathBuf::from("work/items.csv"));
        assert_eq!(config.storage.lock_timeout_ms, 5000);
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "storage = 3").expect("write config");
        let config = Config::load_from_dir(dir.path());
        assert_eq!(config.storage.file, PathBuf::from("tracker.csv"));
    }
}
