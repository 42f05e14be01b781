use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::application::AppKind;
use crate::error::{Error, Result};
use crate::variables::{format_exports, ExportMap};

/// One concrete configuration instance of an application.
///
/// An environment is a read snapshot of the filesystem taken when it was
/// constructed; nothing is cached between listings.
#[derive(Debug, Clone)]
pub enum Environment<'a> {
    /// A YAML file of alias/value pairs exported into the shell
    Variables(VariableEnvironment<'a>),
    /// A directory linked into an external target location
    Directory(DirectoryEnvironment),
}

impl<'a> Environment<'a> {
    pub fn name(&self) -> &str {
        match self {
            Environment::Variables(env) => &env.name,
            Environment::Directory(env) => &env.name,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Environment::Variables(env) => &env.path,
            Environment::Directory(env) => &env.path,
        }
    }

    pub fn kind(&self) -> AppKind {
        match self {
            Environment::Variables(_) => AppKind::Environment,
            Environment::Directory(_) => AppKind::Directory,
        }
    }

    /// Read the instance file and resolve export values. No-op for directories.
    pub fn populate_export_vars(&mut self) -> Result<()> {
        match self {
            Environment::Variables(env) => env.populate_export_vars(),
            Environment::Directory(_) => Ok(()),
        }
    }

    /// Resolved `export` statements; always empty for directories.
    pub fn export_statements(&self) -> Vec<String> {
        match self {
            Environment::Variables(env) => env.export_statements(),
            Environment::Directory(_) => Vec::new(),
        }
    }

    pub fn print_exports(&self, out: &mut dyn Write) -> Result<()> {
        for statement in self.export_statements() {
            writeln!(out, "{statement}").map_err(Error::Output)?;
        }
        Ok(())
    }

    pub fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        match self {
            Environment::Variables(env) => env.save(values),
            Environment::Directory(env) => {
                tracing::warn!(
                    "Environment type {} does not support the save operation, ignoring {:?}",
                    AppKind::Directory,
                    env.path
                );
                Ok(())
            }
        }
    }

    /// Prompt for every known alias and save the answers.
    pub fn construct(&mut self, input: &mut dyn BufRead, prompt: &mut dyn Write) -> Result<()> {
        match self {
            Environment::Variables(env) => env.construct(input, prompt),
            Environment::Directory(_) => Err(Error::Unsupported {
                operation: "construct",
                kind: AppKind::Directory,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariableEnvironment<'a> {
    name: String,
    path: PathBuf,
    exports: &'a ExportMap,
    values: BTreeMap<String, String>,
    resolved: BTreeMap<String, String>,
}

impl<'a> VariableEnvironment<'a> {
    /// Build the environment at `base/name`, seeding stored values from the
    /// file when it exists and with empty values for each alias otherwise.
    pub fn new(name: &str, base: &Path, exports: &'a ExportMap) -> Result<Self> {
        let path = base.join(name);
        let values = if path.exists() {
            read_values(&path)?
        } else {
            exports
                .aliases()
                .iter()
                .map(|alias| (alias.clone(), String::new()))
                .collect()
        };

        Ok(Self {
            name: name.to_string(),
            path,
            exports,
            values,
            resolved: BTreeMap::new(),
        })
    }

    /// Stored alias -> value pairs.
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Export name -> value pairs, empty until populated.
    pub fn resolved(&self) -> &BTreeMap<String, String> {
        &self.resolved
    }

    pub fn populate_export_vars(&mut self) -> Result<()> {
        let stored = read_values(&self.path)?;
        self.resolved = self.exports.materialize(&stored);
        tracing::debug!("{} export vars are {:?}", self.name, self.resolved.keys());
        Ok(())
    }

    pub fn export_statements(&self) -> Vec<String> {
        format_exports(&self.resolved)
    }

    pub fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let contents = serde_yaml::to_string(values).map_err(|err| Error::EnvironmentParse {
            path: self.path.clone(),
            reason: err.to_string(),
        })?;
        fs::write(&self.path, contents).map_err(|err| Error::io(&self.path, err))?;
        tracing::info!("Saved environment {} at {:?}", self.name, self.path);
        Ok(())
    }

    fn construct(&mut self, input: &mut dyn BufRead, prompt: &mut dyn Write) -> Result<()> {
        let exports = self.exports;
        for alias in exports.aliases() {
            write!(prompt, "{alias}: ").map_err(Error::Output)?;
            prompt.flush().map_err(Error::Output)?;

            let mut line = String::new();
            let read = input.read_line(&mut line).map_err(Error::Input)?;
            if read == 0 {
                return Err(Error::PromptAborted(alias.clone()));
            }
            self.values.insert(alias.clone(), line.trim().to_string());
        }

        self.save(&self.values)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEnvironment {
    name: String,
    path: PathBuf,
}

impl DirectoryEnvironment {
    pub fn new(name: &str, base: &Path) -> Self {
        Self {
            name: name.to_string(),
            path: base.join(name),
        }
    }
}

/// Read an instance file as a flat alias -> value mapping.
fn read_values(path: &Path) -> Result<BTreeMap<String, String>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(Error::NotFound(path.to_path_buf()))
        }
        Err(err) => return Err(Error::io(path, err)),
    };

    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let raw: BTreeMap<String, serde_yaml::Value> =
        serde_yaml::from_str(&contents).map_err(|err| Error::EnvironmentParse {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    raw.into_iter()
        .map(|(key, value)| match scalar(value) {
            Some(value) => Ok((key, value)),
            None => Err(Error::EnvironmentParse {
                path: path.to_path_buf(),
                reason: format!("value for '{key}' is not a scalar"),
            }),
        })
        .collect()
}

fn scalar(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Null => Some(String::new()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn vanilla_exports() -> ExportMap {
        ExportMap::parse([
            "username=USERNAME",
            "password=PASSWORD",
            "region=REGION",
            "profile=PROFILE",
        ])
        .unwrap()
    }

    fn setup_vanilla() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("acme"),
            "username: mcmuffin\npassword: holdthestuffin\nregion: nowhere\n",
        )
        .unwrap();
        fs::write(temp.path().join("dyncorp"), "username: [unclosed\n").unwrap();
        temp
    }

    fn aws_exports() -> ExportMap {
        ExportMap::parse([
            "access_key=AWS_ACCESS_KEY_ID",
            "secret_key=AWS_SECRET_ACCESS_KEY",
        ])
        .unwrap()
    }

    fn variables<'a>(name: &str, base: &Path, exports: &'a ExportMap) -> Environment<'a> {
        Environment::Variables(VariableEnvironment::new(name, base, exports).unwrap())
    }

    #[test]
    fn test_new_directory_environment() {
        let temp = TempDir::new().unwrap();
        let env = Environment::Directory(DirectoryEnvironment::new("foo", temp.path()));

        assert_eq!(env.name(), "foo");
        assert_eq!(env.path(), temp.path().join("foo"));
        assert_eq!(env.kind(), AppKind::Directory);
        assert!(env.export_statements().is_empty());
    }

    #[test]
    fn test_new_variable_environment_seeds_empty_values() {
        let temp = TempDir::new().unwrap();
        let exports = vanilla_exports();
        let env = VariableEnvironment::new("acme", temp.path(), &exports).unwrap();

        assert_eq!(env.path, temp.path().join("acme"));
        assert_eq!(env.values().len(), 4);
        assert!(env.values().values().all(String::is_empty));
    }

    #[test]
    fn test_new_variable_environment_loads_existing_file() {
        let temp = setup_vanilla();
        let exports = vanilla_exports();
        let env = VariableEnvironment::new("acme", temp.path(), &exports).unwrap();

        assert_eq!(env.values()["username"], "mcmuffin");
        assert!(!env.values().contains_key("profile"));
    }

    #[test]
    fn test_new_variable_environment_rejects_invalid_yaml() {
        let temp = setup_vanilla();
        let exports = vanilla_exports();
        let result = VariableEnvironment::new("dyncorp", temp.path(), &exports);

        assert!(matches!(result, Err(Error::EnvironmentParse { .. })));
    }

    #[test]
    fn test_populate_export_vars_drops_missing_key() {
        let temp = setup_vanilla();
        let exports = vanilla_exports();
        let mut env = VariableEnvironment::new("acme", temp.path(), &exports).unwrap();
        env.populate_export_vars().unwrap();

        assert_eq!(env.resolved()["USERNAME"], "mcmuffin");
        assert_eq!(env.resolved()["PASSWORD"], "holdthestuffin");
        assert_eq!(env.resolved()["REGION"], "nowhere");
        assert!(!env.resolved().contains_key("PROFILE"));
    }

    #[test]
    fn test_populate_export_vars_missing_file() {
        let exports = vanilla_exports();
        let mut env =
            VariableEnvironment::new("foobar", Path::new("/does/not/exist"), &exports).unwrap();

        assert!(matches!(
            env.populate_export_vars(),
            Err(Error::NotFound(_))
        ));
        assert!(env.resolved().is_empty());
    }

    #[test]
    fn test_scalar_values_are_stringified() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("ops"), "port: 8080\nenabled: true\nempty:\n").unwrap();
        let exports = ExportMap::parse(["port=PORT", "enabled=ENABLED", "empty=EMPTY"]).unwrap();
        let mut env = VariableEnvironment::new("ops", temp.path(), &exports).unwrap();
        env.populate_export_vars().unwrap();

        assert_eq!(
            env.export_statements(),
            ["export EMPTY=", "export ENABLED=true", "export PORT=8080"]
        );
    }

    #[test]
    fn test_nested_values_are_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("ops"), "port:\n  - 1\n  - 2\n").unwrap();
        let exports = ExportMap::parse(["port=PORT"]).unwrap();

        let result = VariableEnvironment::new("ops", temp.path(), &exports);
        assert!(matches!(result, Err(Error::EnvironmentParse { .. })));
    }

    #[test]
    fn test_print_exports_sorted() {
        let temp = setup_vanilla();
        let exports = vanilla_exports();
        let mut env = variables("acme", temp.path(), &exports);
        env.populate_export_vars().unwrap();

        let mut out = Vec::new();
        env.print_exports(&mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "export PASSWORD=holdthestuffin\nexport REGION=nowhere\nexport USERNAME=mcmuffin\n"
        );
    }

    #[test]
    fn test_save_writes_yaml() {
        let temp = TempDir::new().unwrap();
        let exports = vanilla_exports();
        let env = variables("new", temp.path(), &exports);

        let values: BTreeMap<String, String> = [("username", "jdoe"), ("region", "eu-west-1")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        env.save(&values).unwrap();

        let reread = read_values(&temp.path().join("new")).unwrap();
        assert_eq!(reread, values);
    }

    #[test]
    fn test_save_directory_is_noop() {
        let temp = TempDir::new().unwrap();
        let env = Environment::Directory(DirectoryEnvironment::new("acme", temp.path()));

        env.save(&BTreeMap::new()).unwrap();
        assert!(!temp.path().join("acme").exists());
    }

    #[test]
    fn test_construct_prompts_for_each_alias() {
        let temp = TempDir::new().unwrap();
        let exports = aws_exports();
        let mut env = variables("acme", temp.path(), &exports);

        let mut input = Cursor::new("  XXX \nYYY\n");
        let mut prompt = Vec::new();
        env.construct(&mut input, &mut prompt).unwrap();

        assert_eq!(String::from_utf8(prompt).unwrap(), "access_key: secret_key: ");
        let saved = read_values(&temp.path().join("acme")).unwrap();
        assert_eq!(saved["access_key"], "XXX");
        assert_eq!(saved["secret_key"], "YYY");
    }

    #[test]
    fn test_construct_aborts_on_end_of_input() {
        let temp = TempDir::new().unwrap();
        let exports = aws_exports();
        let mut env = variables("acme", temp.path(), &exports);

        let mut input = Cursor::new("XXX\n");
        let result = env.construct(&mut input, &mut Vec::new());

        assert!(matches!(result, Err(Error::PromptAborted(alias)) if alias == "secret_key"));
        assert!(!temp.path().join("acme").exists());
    }

    #[test]
    fn test_construct_reports_unreadable_input() {
        let temp = TempDir::new().unwrap();
        let exports = aws_exports();
        let mut env = variables("acme", temp.path(), &exports);

        let mut input = Cursor::new(vec![0xff, 0xfe, b'\n']);
        let result = env.construct(&mut input, &mut Vec::new());

        assert!(matches!(result, Err(Error::Input(_))));
        assert!(!temp.path().join("acme").exists());
    }

    #[test]
    fn test_construct_directory_unsupported() {
        let temp = TempDir::new().unwrap();
        let mut env = Environment::Directory(DirectoryEnvironment::new("acme", temp.path()));

        let result = env.construct(&mut Cursor::new(""), &mut Vec::new());
        assert!(matches!(result, Err(Error::Unsupported { .. })));
    }
}
