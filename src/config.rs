use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Default home root when neither the flag nor the settings file names one.
pub const DEFAULT_HOME: &str = "~/.ssw";

/// User settings stored in `$XDG_CONFIG_HOME/ssw/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Home root holding `config/` and one directory per application
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
}

impl Settings {
    pub fn default_path() -> Result<PathBuf> {
        Ok(paths::config_dir()?.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file {:?}", path))
    }

    /// Home root spec, falling back to [`DEFAULT_HOME`].
    pub fn home_spec(&self) -> &str {
        self.home.as_deref().unwrap_or(DEFAULT_HOME)
    }
}
