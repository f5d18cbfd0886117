//! Configuration management for Twig.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Twig configuration loaded from .twig/config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Settings for `twig status`.
    #[serde(default)]
    pub status: StatusConfig,
}

impl Config {
    /// Load config from a TOML file.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a TOML file.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| std::io::Error::other(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// General Twig settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Name of the branch created by `init`.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// When to colorize terminal output.
    #[serde(default)]
    pub color: ColorMode,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            color: ColorMode::default(),
        }
    }
}

fn default_branch() -> String {
    "master".into()
}

/// Color output policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colorize when writing to a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

/// Settings for `twig status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Whether to list untracked files.
    #[serde(default = "default_true")]
    pub show_untracked: bool,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            show_untracked: true,
        }
    }
}

const fn default_true() -> bool {
    true
}
