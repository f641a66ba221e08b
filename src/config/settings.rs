//! Application settings and paths.
//!
//! Settings live in an optional JSON file under the XDG configuration
//! directory; command-line flags override whatever it contains.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/portsweep)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the configuration directory. Nothing is created on disk.
    pub fn discover() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "portsweep", "portsweep")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Default timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Default worker count; absent means a single inline worker.
    pub default_threads: Option<usize>,
    /// Enable verbose logging by default.
    pub verbose: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_timeout_ms: 500,
            default_threads: None,
            verbose: false,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location.
    ///
    /// A missing file, or a platform without a home directory, yields the
    /// defaults.
    pub fn load() -> ConfigResult<Self> {
        let paths = match Paths::discover() {
            Ok(paths) => paths,
            Err(ConfigError::DirectoryNotFound) => {
                tracing::debug!("no configuration directory, using default settings");
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };

        let file = paths.settings_file();
        if !file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }
}
