//! Configuration management.

use anyhow::Result;
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Optional settings file. Every field can also be given on the command line,
/// which takes precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project Honeypot http:BL access key.
    pub api_key: Option<String>,

    /// Number of resolver workers.
    pub workers: Option<usize>,

    /// Exit list URL.
    pub exits_url: Option<String>,

    /// Per-lookup timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// http:BL zone.
    pub zone: Option<String>,
}

impl Config {
    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("org", "torhoney", "torhoney")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {e}", path.display()))?;

        Ok(config)
    }
}
