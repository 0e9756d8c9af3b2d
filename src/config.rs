use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid ignore-exclude pattern '{pattern}': {source}")]
    BadIgnorePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Settings read from `config.toml`. Everything is optional; an absent file
/// means no suppression and an unbounded history.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ViewerConfig {
    /// Maximum retained backup runs; 0 or absent keeps every run.
    pub show_logs_number: Option<usize>,
    /// Fragments matched against exclusion values; matching values are hidden.
    pub ignore_exclude: Vec<String>,
}

/// Loads the given config file, or the first one found at the conventional
/// locations, or the defaults when none exists.
pub fn load_config(path: Option<&Path>) -> Result<ViewerConfig, ConfigError> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };
    match path {
        Some(path) => load_config_from_path(&path),
        None => Ok(ViewerConfig::default()),
    }
}

pub fn load_config_from_path(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<ViewerConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

/// First existing config file among `$XDG_CONFIG_HOME`, `$HOME/.config` and
/// `$USERPROFILE/.config`.
fn default_config_path() -> Option<PathBuf> {
    candidate("XDG_CONFIG_HOME", "duplicati-log-viewer/config.toml")
        .or_else(|| candidate("HOME", ".config/duplicati-log-viewer/config.toml"))
        .or_else(|| candidate("USERPROFILE", ".config/duplicati-log-viewer/config.toml"))
}

fn candidate(var: &str, subpath: &str) -> Option<PathBuf> {
    let base = env::var_os(var)?;
    let path = PathBuf::from(base).join(subpath);
    path.is_file().then_some(path)
}
