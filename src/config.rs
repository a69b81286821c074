/// Application configuration
///
/// Settings come from three layers, later ones winning:
/// 1. Built-in defaults (database in the user's data directory)
/// 2. `config.json` in the user's config directory, if present
/// 3. Environment variables `ART_GALLERY_DB` and `ART_GALLERY_BUSY_TIMEOUT_MS`

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Directory name used under the platform data/config directories
const APP_DIR: &str = "art-gallery";

const ENV_DB_PATH: &str = "ART_GALLERY_DB";
const ENV_BUSY_TIMEOUT: &str = "ART_GALLERY_BUSY_TIMEOUT_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid value for {name}: {value}")]
    Env { name: &'static str, value: String },
}

/// Connection settings for the artwork store
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Location of the SQLite database file
    pub database_path: PathBuf,
    /// How long a statement may wait on a locked database before failing
    pub busy_timeout_ms: u64,
    /// Create the database's parent directory if it is missing
    pub create_missing_dirs: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            busy_timeout_ms: 5_000,
            create_missing_dirs: true,
        }
    }
}

impl StoreConfig {
    /// Config for a database at an explicit path, other settings default
    #[cfg(test)]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: path.into(),
            ..Self::default()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Load defaults, then the user's config file, then environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match default_config_file() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            self.database_path = PathBuf::from(path);
        }

        if let Some(value) = lookup(ENV_BUSY_TIMEOUT) {
            self.busy_timeout_ms = value.trim().parse().map_err(|_| ConfigError::Env {
                name: ENV_BUSY_TIMEOUT,
                value,
            })?;
        }

        Ok(())
    }
}

/// Get the path where the database should be stored
/// - Linux: ~/.local/share/art-gallery/gallery.db
/// - macOS: ~/Library/Application Support/art-gallery/gallery.db
/// - Windows: %APPDATA%\art-gallery\gallery.db
fn default_database_path() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    path.push(APP_DIR);
    path.push("gallery.db");
    path
}

fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
}
