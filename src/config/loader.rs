// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for the
/// checked form.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file, validate it and resolve relative directories
/// against the directory the file lives in.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let mut config = ConfigFile::try_from(raw_config)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            config.resolve_paths(parent);
        }
    }

    Ok(config)
}

/// Configuration used when no file is given: every value at its default,
/// directories relative to the working directory.
pub fn default_config() -> Result<ConfigFile> {
    ConfigFile::try_from(RawConfigFile::default())
}
