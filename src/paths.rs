use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Get the home directory
pub fn home_dir() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|bd| bd.home_dir().to_path_buf())
        .ok_or(Error::HomeDirUnavailable)
}

/// Get the XDG config directory for ssw
///
/// Returns `$XDG_CONFIG_HOME/ssw` or `~/.config/ssw` if not set
pub fn config_dir() -> Result<PathBuf> {
    let base = match env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => home_dir()?.join(".config"),
    };

    Ok(base.join("ssw"))
}

/// Expand a `~`-relative or relative path into an absolute one.
///
/// A leading `~` is replaced by the user's home directory. Anything else is
/// resolved against the current working directory. The result is cleaned
/// lexically, so `../bar` lands next to the working directory.
pub fn expand(spec: &str) -> Result<PathBuf> {
    if spec.is_empty() {
        return Err(Error::InvalidPath(spec.to_string()));
    }

    if spec.starts_with('~') {
        let home = home_dir()?;
        return expand_from(spec, &home, &home);
    }

    let cwd = env::current_dir().map_err(|err| Error::io(".", err))?;
    expand_from(spec, Path::new("/"), &cwd)
}

fn expand_from(spec: &str, home: &Path, cwd: &Path) -> Result<PathBuf> {
    if spec.is_empty() {
        return Err(Error::InvalidPath(spec.to_string()));
    }

    let joined = match spec.strip_prefix('~') {
        Some(rest) => home.join(rest.trim_start_matches('/')),
        None => cwd.join(spec),
    };

    Ok(normalize(&joined))
}

fn normalize(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Read the literal target of a symlink.
///
/// Missing paths and non-symlinks are reported as distinct errors so callers
/// can tell "nothing linked" apart from "something else is in the way".
pub fn resolve_symlink(path: &Path) -> Result<PathBuf> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("Path {:?} does not exist", path);
            return Err(Error::NotFound(path.to_path_buf()));
        }
        Err(err) => return Err(Error::io(path, err)),
    };

    if !metadata.file_type().is_symlink() {
        return Err(Error::NotASymlink(path.to_path_buf()));
    }

    fs::read_link(path).map_err(|err| Error::io(path, err))
}

/// Whether anything, including a dangling symlink, occupies `path`.
pub(crate) fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    #[test]
    fn test_expand_tilde() {
        let home = home_dir().unwrap();
        assert_eq!(expand("~/.foo").unwrap(), home.join(".foo"));
        assert_eq!(expand("~").unwrap(), home);
    }

    #[test]
    fn test_expand_relative_parent() {
        let cwd = env::current_dir().unwrap();
        let expected = cwd.parent().unwrap().join("bar");
        assert_eq!(expand("../bar").unwrap(), expected);
    }

    #[test]
    fn test_expand_empty_is_invalid() {
        assert!(matches!(expand(""), Err(Error::InvalidPath(_))));
    }

    #[rstest]
    #[case("~/.chef", "/home/acme/.chef")]
    #[case("~.chef", "/home/acme/.chef")]
    #[case("~/a/../b", "/home/acme/b")]
    #[case("conf/./knife.rb", "/work/conf/knife.rb")]
    #[case("../bar", "/bar")]
    #[case("/etc/chef", "/etc/chef")]
    #[case("/../..", "/")]
    fn test_expand_from(#[case] input: &str, #[case] expected: &str) {
        let actual = expand_from(input, Path::new("/home/acme"), Path::new("/work")).unwrap();
        assert_eq!(actual, PathBuf::from(expected));
    }

    #[test]
    fn test_resolve_symlink_real_link() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        let link = temp.path().join("link");
        fs::write(&source, "").unwrap();
        symlink(&source, &link).unwrap();

        assert_eq!(resolve_symlink(&link).unwrap(), source);
    }

    #[test]
    fn test_resolve_symlink_returns_literal_target() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("link");
        symlink("acme", &link).unwrap();

        assert_eq!(resolve_symlink(&link).unwrap(), PathBuf::from("acme"));
    }

    #[test]
    fn test_resolve_symlink_missing() {
        let result = resolve_symlink(Path::new("/does/not/exist"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_resolve_symlink_not_a_symlink() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain");
        fs::write(&file, "").unwrap();

        assert!(matches!(resolve_symlink(&file), Err(Error::NotASymlink(_))));
        assert!(matches!(
            resolve_symlink(temp.path()),
            Err(Error::NotASymlink(_))
        ));
    }

    #[test]
    fn test_occupied_sees_dangling_link() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("dangling");
        symlink(temp.path().join("gone"), &link).unwrap();

        assert!(occupied(&link));
        assert!(!link.exists());
    }
}
