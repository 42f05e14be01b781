use std::fs;
use std::io::Write;
use std::path::Path;

use crate::application::Application;
use crate::error::{Error, Result};
use crate::ui::{Palette, StatusKind};

/// Which applications to operate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Named(Vec<String>),
}

impl Selection {
    /// No names, or the single name `all`, selects every application.
    pub fn from_args(names: Vec<String>) -> Self {
        if names.is_empty() || (names.len() == 1 && names[0] == "all") {
            Selection::All
        } else {
            Selection::Named(names)
        }
    }
}

/// Applications discovered under a home root.
///
/// Applications whose definition fails to load are logged and kept aside in
/// [`ApplicationSet::skipped`]; the rest remain usable.
#[derive(Debug)]
pub struct ApplicationSet {
    apps: Vec<Application>,
    skipped: Vec<(String, Error)>,
}

impl ApplicationSet {
    pub fn discover(home: &Path, selection: &Selection) -> Result<Self> {
        if !home.is_dir() {
            tracing::error!("The home directory {:?} does not exist", home);
            return Err(Error::HomeNotFound(home.to_path_buf()));
        }

        let names = match selection {
            Selection::All => app_names(home)?,
            Selection::Named(names) => names.clone(),
        };

        let mut apps = Vec::new();
        let mut skipped = Vec::new();
        for name in names {
            match Application::open(home, &name) {
                Ok(app) => apps.push(app),
                Err(err) => {
                    tracing::error!("Skipping application {name}: {err}");
                    skipped.push((name, err));
                }
            }
        }

        Ok(Self {
            apps,
            skipped,
        })
    }

    pub fn apps(&self) -> &[Application] {
        &self.apps
    }

    pub fn skipped(&self) -> &[(String, Error)] {
        &self.skipped
    }

    /// Print each application, its current environment and the others.
    pub fn list(&self, out: &mut dyn Write, palette: &Palette) -> Result<()> {
        for app in &self.apps {
            writeln!(out, "{}:", palette.paint(StatusKind::Heading, app.name()))
                .map_err(Error::Output)?;

            let current = match app.current_name() {
                Ok(current) => current,
                Err(err) => {
                    tracing::warn!("Could not read current environment of {}: {err}", app.name());
                    None
                }
            };
            let written = match &current {
                Some(name) => writeln!(
                    out,
                    "\t{}\t{}",
                    palette.paint(StatusKind::Success, name),
                    palette.paint(StatusKind::Success, "CURRENT")
                ),
                None => writeln!(
                    out,
                    "{}",
                    palette.paint(StatusKind::Error, "No environment currently in use")
                ),
            };
            written.map_err(Error::Output)?;

            let names = match app.environment_names() {
                Ok(names) => names,
                Err(err) => {
                    tracing::error!("Could not list environments of {}: {err}", app.name());
                    continue;
                }
            };
            for name in names.iter().filter(|name| Some(*name) != current.as_ref()) {
                writeln!(out, "\t{name}").map_err(Error::Output)?;
            }
        }
        Ok(())
    }

    /// Print the environment in use for every application.
    pub fn show(&self, out: &mut dyn Write, palette: &Palette) -> Result<()> {
        writeln!(out, "Environments in use:").map_err(Error::Output)?;
        for app in &self.apps {
            let name = palette.paint(StatusKind::Success, app.name());
            let written = match app.current_name() {
                Ok(Some(current)) => {
                    writeln!(out, "{name}\t{}", palette.paint(StatusKind::Heading, current))
                }
                Ok(None) => writeln!(out, "{name}\tno environment currently configured"),
                Err(err) => writeln!(out, "{name}\t{err}"),
            };
            written.map_err(Error::Output)?;
        }
        Ok(())
    }

    /// Load every application, returning the ones that failed.
    pub fn load(&self, out: &mut dyn Write) -> Vec<(String, Error)> {
        self.each(|app| app.load(&mut *out))
    }

    /// Unload every application, returning the ones that failed.
    pub fn unload(&self, out: &mut dyn Write) -> Vec<(String, Error)> {
        self.each(|app| app.unload(&mut *out))
    }

    fn each(&self, mut action: impl FnMut(&Application) -> Result<()>) -> Vec<(String, Error)> {
        self.apps
            .iter()
            .filter_map(|app| match action(app) {
                Ok(()) => None,
                Err(err) => Some((app.name().to_string(), err)),
            })
            .collect()
    }
}

/// Every entry under `home` except the `config` directory, sorted.
fn app_names(home: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(home).map_err(|err| Error::io(home, err))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| Error::io(home, err))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name != "config" {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
