use std::path::PathBuf;

use thiserror::Error;

use crate::env::optional_env_var;

/// Errors related to locating application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither an explicit path nor the fallback environment variable was given.
    #[error("no config path given and {0} is not set")]
    NoConfigPath(String),
}

/// Picks the config file path: an explicit value wins, then `env_name`.
///
/// Returns `Ok(None)` when `required` is false and nothing was supplied, so
/// callers can fall back to built-in defaults.
pub fn resolve_config_path(
    explicit: Option<PathBuf>,
    env_name: &str,
    required: bool,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(p) = explicit {
        return Ok(Some(p));
    }
    match optional_env_var(env_name) {
        Some(v) => Ok(Some(PathBuf::from(v))),
        None if required => Err(ConfigError::NoConfigPath(env_name.to_string())),
        None => Ok(None),
    }
}
