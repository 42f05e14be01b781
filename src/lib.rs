// Public API
pub mod cli;
pub mod commands;
pub mod ui;

// Core domain types
mod app_set;
mod application;
mod config;
mod environment;
mod error;
mod home;
mod paths;
mod variables;

// Re-export main types
pub use app_set::{ApplicationSet, Selection};
pub use application::{AppKind, Application, Switch, CURRENT_LINK, DEFINITION_EXTENSION};
pub use config::{Settings, DEFAULT_HOME};
pub use environment::{DirectoryEnvironment, Environment, VariableEnvironment};
pub use error::{Error, Result};
pub use home::{HomePath, SswHome};
pub use paths::{config_dir, expand, home_dir, resolve_symlink};
pub use variables::{format_exports, format_unsets, ExportMap};
