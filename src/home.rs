use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_set::{ApplicationSet, Selection};
use crate::application::{Application, DEFINITION_EXTENSION};
use crate::config::Settings;
use crate::paths;

/// Home path types
#[derive(Debug, Clone, Copy)]
pub enum HomePath {
    /// Home root: ~/.ssw unless configured otherwise
    Root,
    /// Definitions directory: home/config
    Config,
}

/// SswHome - the directory tree holding definitions and environments
///
/// ```text
/// <root>/config/<app>.ssw    application definitions
/// <root>/<app>/<env>         environment instances
/// <root>/<app>/current       symlink to the active instance
/// ```
#[derive(Debug, Clone)]
pub struct SswHome {
    root: PathBuf,
}

impl SswHome {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the home root
    ///
    /// An explicit flag wins, then the `home` key of the settings file,
    /// then `~/.ssw`.
    pub fn resolve(flag: Option<&str>) -> Result<Self> {
        let spec = match flag {
            Some(spec) => spec.to_string(),
            None => {
                let settings = Settings::load(&Settings::default_path()?)?;
                settings.home_spec().to_string()
            }
        };

        let root = paths::expand(&spec)
            .with_context(|| format!("Invalid home directory {:?}", spec))?;
        tracing::debug!("Using home directory {:?}", root);
        Ok(Self::new(root))
    }

    /// Get path for a specific home location
    pub fn path(&self, path_type: HomePath) -> PathBuf {
        match path_type {
            HomePath::Root => self.root.clone(),
            HomePath::Config => self.root.join("config"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn app_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn definition(&self, name: &str) -> PathBuf {
        self.path(HomePath::Config)
            .join(format!("{name}.{DEFINITION_EXTENSION}"))
    }

    /// Check if home exists (has been initialized)
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Create the home layout, returning the directories that were missing
    pub fn init(&self, apps: &[String]) -> Result<Vec<PathBuf>> {
        let mut wanted = vec![self.path(HomePath::Config)];
        wanted.extend(apps.iter().map(|app| self.app_dir(app)));

        let mut created = Vec::new();
        for dir in wanted {
            if dir.is_dir() {
                tracing::debug!("Directory {:?} already exists", dir);
                continue;
            }
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory {:?}", dir))?;
            created.push(dir);
        }

        Ok(created)
    }

    pub fn application(&self, name: &str) -> Result<Application> {
        Application::load_definition(&self.definition(name))
            .with_context(|| format!("Failed to load application '{name}'"))
    }

    pub fn applications(&self, selection: &Selection) -> Result<ApplicationSet> {
        Ok(ApplicationSet::discover(&self.root, selection)?)
    }
}
