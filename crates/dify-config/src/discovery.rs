//! Config file discovery.
//!
//! Resolution order (later overrides earlier):
//! 1. Built-in defaults
//! 2. `~/.config/dify/config.toml` (XDG user config, or `$DIFY_CONFIG_DIR/config.toml`)
//! 3. Environment variables (`DIFY_BASE_URL`, `DIFY_API_KEY`, ...)

use std::path::{Path, PathBuf};

use crate::{ConfigError, DifyConfig, Result};

/// Default config filename within the config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "dify";

/// Environment variable to override the config directory.
const CONFIG_DIR_ENV: &str = "DIFY_CONFIG_DIR";

/// Load configuration from the user config file (if any) and the environment.
///
/// A missing config file is not an error; defaults are used instead.
/// The result is validated before it is returned.
pub fn load_config() -> Result<DifyConfig> {
    let mut config = match xdg_config_path() {
        Some(path) if path.is_file() => load_config_file(&path)?,
        _ => DifyConfig::default(),
    };
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a specific file path (no discovery, no environment).
pub fn load_config_file(path: &Path) -> Result<DifyConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    DifyConfig::from_toml(&contents)
}

/// Get the config file path.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Get the config directory.
///
/// Checks `DIFY_CONFIG_DIR` first, then falls back to the platform default
/// (`~/.config/dify` on Linux, `~/Library/Application Support/dify` on macOS).
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
