// src/payload/permissions.rs

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::{LauncherError, Result};
use crate::host::FileStore;

/// What to do when the payload could not be marked executable.
///
/// - `Ignore` (default): carry on and attempt the spawn anyway. A copy left
///   over from an earlier launch is usually still executable.
/// - `Warn`: same, but log a warning first.
/// - `Abort`: stop before spawning with [`LauncherError::Permission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    #[default]
    Ignore,
    Warn,
    Abort,
}

impl PermissionPolicy {
    /// Apply the policy to the result of [`grant_executable`].
    pub fn check(self, granted: bool, path: &Path) -> Result<()> {
        if granted {
            return Ok(());
        }
        match self {
            PermissionPolicy::Ignore => Ok(()),
            PermissionPolicy::Warn => {
                warn!(path = ?path, "could not mark payload executable; spawning anyway");
                Ok(())
            }
            PermissionPolicy::Abort => Err(LauncherError::Permission(path.to_path_buf())),
        }
    }
}

impl FromStr for PermissionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ignore" => Ok(PermissionPolicy::Ignore),
            "warn" => Ok(PermissionPolicy::Warn),
            "abort" => Ok(PermissionPolicy::Abort),
            other => Err(format!(
                "invalid permission_policy: {other} (expected \"ignore\", \"warn\" or \"abort\")"
            )),
        }
    }
}

/// Mark the materialized payload executable for the current user.
pub fn grant_executable(store: &dyn FileStore, path: &Path) -> bool {
    let granted = store.grant_executable(path);
    debug!(path = ?path, granted, "execute permission");
    granted
}
