use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::environment::{DirectoryEnvironment, Environment, VariableEnvironment};
use crate::error::{Error, Result};
use crate::paths;
use crate::variables::{format_unsets, ExportMap};

/// Name of the symlink that marks the active environment.
pub const CURRENT_LINK: &str = "current";

/// Extension of application definition files under `<home>/config`.
pub const DEFINITION_EXTENSION: &str = "ssw";

/// How an application's environments are stored and activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    /// Environments are variable files exported into the shell
    Environment,
    /// Environments are directories linked into a target path
    Directory,
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppKind::Environment => write!(f, "environment"),
            AppKind::Directory => write!(f, "directory"),
        }
    }
}

/// Raw contents of `<home>/config/<app>.ssw`.
#[derive(Debug, Clone, Deserialize)]
struct Definition {
    #[serde(rename = "type")]
    kind: AppKind,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    variables: Vec<String>,
    #[serde(default)]
    load: Option<String>,
    #[serde(default)]
    unload: Option<String>,
}

#[derive(Debug, Clone)]
enum Layout {
    Environment {
        declared: Vec<String>,
        exports: ExportMap,
    },
    Directory {
        target: PathBuf,
    },
}

#[derive(Debug, Clone, Copy)]
enum Hook {
    Load,
    Unload,
}

impl Hook {
    fn as_str(self) -> &'static str {
        match self {
            Hook::Load => "load",
            Hook::Unload => "unload",
        }
    }
}

/// Outcome of a successful `make_current`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Switch {
    /// The requested environment was already linked; nothing changed
    AlreadyCurrent,
    /// The links now point at the requested environment
    Switched { previous: Option<String> },
}

/// A managed application and the environments stored for it.
///
/// Switching is a remove-then-create sequence on one or two symlinks and is
/// not safe against a second process switching the same application.
#[derive(Debug, Clone)]
pub struct Application {
    name: String,
    home: PathBuf,
    definition: PathBuf,
    layout: Layout,
    load_action: Option<String>,
    unload_action: Option<String>,
}

impl Application {
    /// Load `<ssw_home>/config/<name>.ssw`.
    pub fn open(ssw_home: &Path, name: &str) -> Result<Self> {
        let definition = ssw_home
            .join("config")
            .join(format!("{name}.{DEFINITION_EXTENSION}"));
        Self::load_definition(&definition)
    }

    /// Load an application from its definition file.
    ///
    /// The name is the file stem and environments live in `<name>` next to
    /// the definition's `config` directory.
    pub fn load_definition(definition: &Path) -> Result<Self> {
        let name = definition
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| Error::InvalidPath(definition.display().to_string()))?
            .to_string();
        let root = definition
            .parent()
            .and_then(Path::parent)
            .ok_or_else(|| Error::InvalidPath(definition.display().to_string()))?;

        tracing::debug!("Parsing application {name} from {:?}", definition);
        let contents = match fs::read_to_string(definition) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::DefinitionNotFound {
                    app: name,
                    path: definition.to_path_buf(),
                })
            }
            Err(err) => return Err(Error::io(definition, err)),
        };

        let parsed: Definition =
            serde_yaml::from_str(&contents).map_err(|source| Error::DefinitionParse {
                path: definition.to_path_buf(),
                source,
            })?;

        let layout = match parsed.kind {
            AppKind::Environment => Layout::Environment {
                exports: ExportMap::parse(&parsed.variables)?,
                declared: parsed.variables,
            },
            AppKind::Directory => {
                let target = parsed.target.as_deref().ok_or_else(|| Error::InvalidTarget {
                    app: name.clone(),
                    reason: "no target declared".to_string(),
                })?;
                let target = resolve_target(&name, target)?;
                let app_home = root.join(&name);
                if target.starts_with(&app_home) {
                    return Err(Error::InvalidTarget {
                        app: name,
                        reason: format!("{target:?} lies inside the application home {app_home:?}"),
                    });
                }
                tracing::debug!("Target for {name} is {:?}", target);
                Layout::Directory { target }
            }
        };

        Ok(Self {
            home: root.join(&name),
            name,
            definition: definition.to_path_buf(),
            layout,
            load_action: parsed.load,
            unload_action: parsed.unload,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AppKind {
        match self.layout {
            Layout::Environment { .. } => AppKind::Environment,
            Layout::Directory { .. } => AppKind::Directory,
        }
    }

    /// Directory holding this application's environments.
    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn definition_path(&self) -> &Path {
        &self.definition
    }

    /// Expanded external link location; directory applications only.
    pub fn target(&self) -> Option<&Path> {
        match &self.layout {
            Layout::Directory { target } => Some(target.as_path()),
            Layout::Environment { .. } => None,
        }
    }

    /// Raw `alias=EXPORT_NAME` declarations in definition order.
    pub fn declared_variables(&self) -> &[String] {
        match &self.layout {
            Layout::Environment { declared, .. } => declared.as_slice(),
            Layout::Directory { .. } => &[],
        }
    }

    pub fn exports(&self) -> Option<&ExportMap> {
        match &self.layout {
            Layout::Environment { exports, .. } => Some(exports),
            Layout::Directory { .. } => None,
        }
    }

    pub fn load_action(&self) -> Option<&str> {
        self.load_action.as_deref()
    }

    pub fn unload_action(&self) -> Option<&str> {
        self.unload_action.as_deref()
    }

    pub fn current_link(&self) -> PathBuf {
        self.home.join(CURRENT_LINK)
    }

    /// Export names this application manages, sorted.
    pub fn export_names(&self) -> Vec<&str> {
        self.exports()
            .map(|exports| exports.export_names().collect())
            .unwrap_or_default()
    }

    /// `unset` statements for every export name; empty for directories.
    pub fn unset_statements(&self) -> Vec<String> {
        format_unsets(self.export_names())
    }

    /// Name of the environment `current` points at, if any.
    pub fn current_name(&self) -> Result<Option<String>> {
        let link = self.current_link();
        let target = match paths::resolve_symlink(&link) {
            Ok(target) => target,
            Err(Error::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };

        target
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| Some(name.to_string()))
            .ok_or_else(|| Error::InvalidPath(target.display().to_string()))
    }

    /// The environment `current` points at.
    pub fn current(&self) -> Result<Environment<'_>> {
        let name = self
            .current_name()?
            .ok_or_else(|| Error::NoCurrentEnvironment(self.name.clone()))?;
        self.build_environment(&name)
    }

    /// A single existing environment by name.
    pub fn environment(&self, name: &str) -> Result<Environment<'_>> {
        if !is_environment_name(name) || !self.home.join(name).exists() {
            return Err(Error::EnvironmentNotFound {
                app: self.name.clone(),
                env: name.to_string(),
            });
        }
        self.build_environment(name)
    }

    /// An environment that may not exist on disk yet, for `construct`.
    pub fn new_environment(&self, name: &str) -> Result<Environment<'_>> {
        if !is_environment_name(name) {
            return Err(Error::InvalidPath(name.to_string()));
        }
        fs::create_dir_all(&self.home).map_err(|err| Error::io(&self.home, err))?;
        self.build_environment(name)
    }

    /// Names of every environment on disk, sorted, without `current`.
    pub fn environment_names(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.home) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("{:?} does not exist, no environments", self.home);
                return Ok(Vec::new());
            }
            Err(err) => return Err(Error::io(&self.home, err)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| Error::io(&self.home, err))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name != CURRENT_LINK {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn list_environments(&self) -> Result<Vec<Environment<'_>>> {
        self.environment_names()?
            .iter()
            .map(|name| self.build_environment(name))
            .collect()
    }

    fn build_environment(&self, name: &str) -> Result<Environment<'_>> {
        match &self.layout {
            Layout::Environment { exports, .. } => Ok(Environment::Variables(
                VariableEnvironment::new(name, &self.home, exports)?,
            )),
            Layout::Directory { .. } => Ok(Environment::Directory(DirectoryEnvironment::new(
                name, &self.home,
            ))),
        }
    }

    /// Switch `current` (and the target link) to `env_name`.
    ///
    /// Environment applications write `unset` statements for every export
    /// name followed by the new environment's `export` statements to `out`.
    pub fn make_current(&self, env_name: &str, out: &mut dyn Write) -> Result<Switch> {
        let mut next = self.environment(env_name)?;
        let previous = self.current_name()?;
        tracing::debug!("Current environment for {} is {:?}", self.name, previous);

        if previous.as_deref() == Some(env_name) {
            tracing::debug!(
                "{env_name} is already the current environment for application {}",
                self.name
            );
            return Ok(Switch::AlreadyCurrent);
        }

        if let Some(previous) = &previous {
            self.run_hook(Hook::Unload, previous)?;
        }

        let printed = self.write_switch_statements(&mut next, out);

        self.unlink()?;
        self.link(env_name)?;
        printed?;

        self.run_hook(Hook::Load, env_name)?;
        Ok(Switch::Switched { previous })
    }

    fn write_switch_statements(
        &self,
        next: &mut Environment<'_>,
        out: &mut dyn Write,
    ) -> Result<()> {
        if self.kind() != AppKind::Environment {
            return Ok(());
        }

        if let Err(err) = next.populate_export_vars() {
            tracing::warn!("No variables exported for {}: {err}", next.name());
        }
        for statement in self.unset_statements() {
            writeln!(out, "{statement}").map_err(Error::Output)?;
        }
        next.print_exports(out)
    }

    /// Remove the current link, and the target link for directory applications.
    pub fn unlink(&self) -> Result<()> {
        let current = self.current_link();
        match paths::resolve_symlink(&current) {
            Ok(_) => {}
            Err(Error::NotFound(_)) => {
                tracing::debug!("Current symlink {:?} does not exist, nothing to do", current);
                return Ok(());
            }
            Err(err) => return Err(err),
        }

        if let Layout::Directory { target } = &self.layout {
            tracing::debug!("Removing target symlink for {} at {:?}", self.name, target);
            remove_link(target)?;
            return fs::remove_file(&current).map_err(|source| Error::PartialUnlink {
                app: self.name.clone(),
                removed: target.clone(),
                remaining: current.clone(),
                source,
            });
        }

        fs::remove_file(&current).map_err(|err| Error::io(&current, err))
    }

    /// Point the current link, and the target link for directory
    /// applications, at `env_name`.
    pub fn link(&self, env_name: &str) -> Result<()> {
        let source = self.home.join(env_name);
        let current = self.current_link();
        symlink(&source, &current).map_err(|err| Error::io(&current, err))?;

        if let Layout::Directory { target } = &self.layout {
            let linked = remove_link(target).and_then(|()| {
                symlink(&source, target).map_err(|err| Error::io(target, err))
            });
            if let Err(err) = linked {
                return Err(Error::PartialLink {
                    app: self.name.clone(),
                    linked: current,
                    failed: target.clone(),
                    source: Box::new(err),
                });
            }
        }

        tracing::info!("Linked {} to {:?}", self.name, source);
        Ok(())
    }

    /// Export the current environment and run the load hook.
    pub fn load(&self, out: &mut dyn Write) -> Result<()> {
        let mut current = self.current()?;
        if self.kind() == AppKind::Environment {
            tracing::debug!("Exporting environment variables for application {}", self.name);
            current.populate_export_vars()?;
            current.print_exports(out)?;
        } else {
            tracing::debug!("Application {} has no environment variables to export", self.name);
        }
        self.run_hook(Hook::Load, current.name())
    }

    /// Run the unload hook and unset every export name.
    pub fn unload(&self, out: &mut dyn Write) -> Result<()> {
        let current = self
            .current_name()?
            .ok_or_else(|| Error::NoCurrentEnvironment(self.name.clone()))?;
        self.run_hook(Hook::Unload, &current)?;
        for statement in self.unset_statements() {
            writeln!(out, "{statement}").map_err(Error::Output)?;
        }
        Ok(())
    }

    fn run_hook(&self, hook: Hook, env_name: &str) -> Result<()> {
        let action = match hook {
            Hook::Load => self.load_action.as_deref(),
            Hook::Unload => self.unload_action.as_deref(),
        };
        let Some(action) = action else {
            return Ok(());
        };

        let env_path = self.home.join(env_name);
        tracing::debug!("Running {} hook for {}: {action}", hook.as_str(), self.name);

        // stdout is reserved for statements the calling shell evaluates
        let status = Command::new("sh")
            .arg("-c")
            .arg(action)
            .env("SSW_ENV_PATH", &env_path)
            .env("SSW_ENV", env_name)
            .env("SSW_APP", &self.name)
            .stdin(Stdio::null())
            .stdout(Stdio::from(io::stderr()))
            .status()
            .map_err(|source| Error::HookSpawn {
                app: self.name.clone(),
                hook: hook.as_str(),
                source,
            })?;

        if !status.success() {
            return Err(Error::HookFailed {
                app: self.name.clone(),
                hook: hook.as_str(),
                status,
            });
        }
        Ok(())
    }
}

fn is_environment_name(name: &str) -> bool {
    !name.is_empty() && name != CURRENT_LINK && name != "." && name != ".." && !name.contains('/')
}

fn resolve_target(app: &str, target: &str) -> Result<PathBuf> {
    let expanded = shellexpand::env(target).map_err(|err| Error::InvalidTarget {
        app: app.to_string(),
        reason: format!("failed to expand '{target}': {err}"),
    })?;
    paths::expand(&expanded).map_err(|err| Error::InvalidTarget {
        app: app.to_string(),
        reason: err.to_string(),
    })
}

/// Remove a symlink, refusing to touch anything that is not one.
fn remove_link(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::io(path, err)),
        Ok(metadata) if !metadata.file_type().is_symlink() => {
            Err(Error::NotASymlink(path.to_path_buf()))
        }
        Ok(_) => fs::remove_file(path).map_err(|err| Error::io(path, err)),
    }
}
