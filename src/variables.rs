use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Translation between the aliases stored in environment files and the
/// variable names exported into the shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportMap {
    /// export name -> alias
    exports: BTreeMap<String, String>,
    /// aliases in declaration order, without duplicates
    aliases: Vec<String>,
}

impl ExportMap {
    /// Parse `alias=EXPORT_NAME` declarations.
    ///
    /// Each declaration is split on its first `=`. When two declarations share
    /// an export name the later alias replaces the earlier one.
    pub fn parse<I, S>(declarations: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::default();

        for declaration in declarations {
            let declaration = declaration.as_ref();
            let (alias, export) = declaration
                .split_once('=')
                .map(|(alias, export)| (alias.trim(), export.trim()))
                .filter(|(alias, export)| !alias.is_empty() && !export.is_empty())
                .ok_or_else(|| Error::InvalidDeclaration(declaration.to_string()))?;

            if let Some(previous) = map.exports.insert(export.to_string(), alias.to_string()) {
                tracing::debug!("{export} was mapped to {previous}, now mapped to {alias}");
            }
            if !map.aliases.iter().any(|known| known == alias) {
                map.aliases.push(alias.to_string());
            }
        }

        Ok(map)
    }

    /// Alias for an export name.
    pub fn alias(&self, export: &str) -> Option<&str> {
        self.exports.get(export).map(String::as_str)
    }

    /// Aliases in the order they were first declared.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Every export name, sorted.
    pub fn export_names(&self) -> impl Iterator<Item = &str> {
        self.exports.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    /// Join stored alias values against the map.
    ///
    /// Export names whose alias has no stored value are dropped entirely, not
    /// set to an empty string.
    pub fn materialize(&self, stored: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        self.exports
            .iter()
            .filter_map(|(export, alias)| {
                stored
                    .get(alias)
                    .map(|value| (export.clone(), value.clone()))
            })
            .collect()
    }
}

/// `export NAME=VALUE` lines sorted by name.
pub fn format_exports(resolved: &BTreeMap<String, String>) -> Vec<String> {
    // BTreeMap iteration is already ordered by name
    resolved
        .iter()
        .map(|(name, value)| format!("export {name}={value}"))
        .collect()
}

/// `unset NAME` lines sorted by name, one per distinct name.
pub fn format_unsets<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut names: Vec<String> = names
        .into_iter()
        .map(|name| name.as_ref().to_string())
        .collect();
    names.sort();
    names.dedup();
    names
        .into_iter()
        .map(|name| format!("unset {name}"))
        .collect()
}
