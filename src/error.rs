use std::path::PathBuf;
use thiserror::Error;

/// Convenience Result type with the crate Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving and switching environments.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid path {0:?}")]
    InvalidPath(String),

    #[error("Could not determine the user's home directory")]
    HomeDirUnavailable,

    #[error("Path {0:?} does not exist")]
    NotFound(PathBuf),

    #[error("Path {0:?} exists but is not a symlink")]
    NotASymlink(PathBuf),

    #[error("The home directory {0:?} does not exist")]
    HomeNotFound(PathBuf),

    #[error("No definition for application '{app}' at {path:?}")]
    DefinitionNotFound { app: String, path: PathBuf },

    #[error("Invalid definition file {path:?}: {source}")]
    DefinitionParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid variable declaration '{0}', expected alias=EXPORT_NAME")]
    InvalidDeclaration(String),

    #[error("Invalid target for application '{app}': {reason}")]
    InvalidTarget { app: String, reason: String },

    #[error("Environment '{env}' does not exist for application '{app}'")]
    EnvironmentNotFound { app: String, env: String },

    #[error("Invalid environment file {path:?}: {reason}")]
    EnvironmentParse { path: PathBuf, reason: String },

    #[error("No environment currently in use for application '{0}'")]
    NoCurrentEnvironment(String),

    #[error(
        "Unlink of '{app}' only half completed: removed {removed:?} but could not remove {remaining:?}: {source}"
    )]
    PartialUnlink {
        app: String,
        removed: PathBuf,
        remaining: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Link of '{app}' only half completed: created {linked:?} but could not create {failed:?}: {source}"
    )]
    PartialLink {
        app: String,
        linked: PathBuf,
        failed: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("{hook} hook for application '{app}' failed with {status}")]
    HookFailed {
        app: String,
        hook: &'static str,
        status: std::process::ExitStatus,
    },

    #[error("Failed to run {hook} hook for application '{app}': {source}")]
    HookSpawn {
        app: String,
        hook: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} is not supported for {kind} applications")]
    Unsupported {
        operation: &'static str,
        kind: crate::application::AppKind,
    },

    #[error("Input ended before a value for '{0}' was entered")]
    PromptAborted(String),

    #[error("Failed to write output: {0}")]
    Output(#[source] std::io::Error),

    #[error("Failed to read input: {0}")]
    Input(#[source] std::io::Error),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the error only means that nothing is linked as current.
    pub fn is_no_current(&self) -> bool {
        matches!(self, Error::NoCurrentEnvironment(_))
    }
}
