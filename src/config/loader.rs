use crate::config::schema::{DispatcherConfig, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to produce a [`DispatcherConfig`]. Errors from
/// [`load_from_path`] name the file they came from.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read dispatcher config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed dispatcher config{}: {source}", location(.path))]
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },

    #[error("dispatcher config{} failed validation:\n{source}", location(.path))]
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    fn located(self, file: &Path) -> Self {
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(file.to_path_buf()),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(file.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

fn location(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {}", p.display()))
        .unwrap_or_default()
}

/// Parse a dispatcher config from TOML.
///
/// Built-in defaults for the configured language are applied first; the
/// tables in the document extend and override them.
pub fn load_from_str(input: &str) -> Result<DispatcherConfig, ConfigError> {
    let parsed: DispatcherConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    let config = merge_defaults(parsed);
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<DispatcherConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.located(path))
}

fn merge_defaults(parsed: DispatcherConfig) -> DispatcherConfig {
    let mut config = DispatcherConfig::for_language(&parsed.language);
    config.default_priority = parsed.default_priority;
    config.priorities.extend(parsed.priorities);
    config.node_names.extend(parsed.node_names);
    config.field_names.extend(parsed.field_names);
    config.start_rules.extend(parsed.start_rules);
    config
}
