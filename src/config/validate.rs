// src/config/validate.rs

use std::path::{Component, Path};
use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{LauncherError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = LauncherError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_asset_name(&raw.launcher.asset_name)?;
        validate_log_tag(&raw.launcher.log_tag)?;
        let run_timeout = validate_run_timeout(raw.launcher.run_timeout.as_deref())?;
        Ok(ConfigFile::new_unchecked(raw.launcher, run_timeout))
    }
}

/// The asset name doubles as the file name inside the writable directory, so
/// it has to be exactly one normal path component.
fn validate_asset_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LauncherError::ConfigError(
            "[launcher].asset_name must not be empty".to_string(),
        ));
    }

    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal || name.contains('/') || name.contains('\\') {
        return Err(LauncherError::ConfigError(format!(
            "[launcher].asset_name must be a plain file name (got '{}')",
            name
        )));
    }

    Ok(())
}

fn validate_log_tag(tag: &str) -> Result<()> {
    if tag.trim().is_empty() {
        return Err(LauncherError::ConfigError(
            "[launcher].log_tag must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_run_timeout(raw: Option<&str>) -> Result<Option<Duration>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let timeout = parse_duration(raw).map_err(|e| {
        LauncherError::ConfigError(format!("[launcher].run_timeout: {}", e))
    })?;

    if timeout.is_zero() {
        return Err(LauncherError::ConfigError(
            "[launcher].run_timeout must be greater than zero".to_string(),
        ));
    }

    Ok(Some(timeout))
}
