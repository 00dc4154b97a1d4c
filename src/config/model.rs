// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::engine::{DEFAULT_ASSET_NAME, DEFAULT_LOG_TAG, DEFAULT_TARGET_ADDRESS, LaunchSettings};
use crate::exec::SuperviseOptions;
use crate::payload::PermissionPolicy;

/// Where relayed payload output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Plain lines on stdout.
    #[default]
    Stdout,
    /// `tracing` events (same stream as our own logs).
    Log,
}

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [launcher]
/// asset_dir = "assets"
/// files_dir = "files"
/// asset_name = "b_collector_monitor"
/// args = ["192.168.1.50"]
/// log_tag = "[B_MONITOR]"
/// permission_policy = "ignore"
/// output = "stdout"
/// run_timeout = "30s"
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub launcher: LauncherSection,
}

/// `[launcher]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LauncherSection {
    /// Directory holding the bundled assets.
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,

    /// Private writable directory the payload is copied into.
    #[serde(default = "default_files_dir")]
    pub files_dir: PathBuf,

    #[serde(default = "default_asset_name")]
    pub asset_name: String,

    /// Arguments passed to the payload, in order.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    #[serde(default = "default_log_tag")]
    pub log_tag: String,

    #[serde(default)]
    pub permission_policy: PermissionPolicy,

    #[serde(default)]
    pub output: OutputMode,

    /// Duration string (e.g. `"30s"`). Absent means no timeout.
    #[serde(default)]
    pub run_timeout: Option<String>,
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_files_dir() -> PathBuf {
    PathBuf::from("files")
}

fn default_asset_name() -> String {
    DEFAULT_ASSET_NAME.to_string()
}

fn default_args() -> Vec<String> {
    vec![DEFAULT_TARGET_ADDRESS.to_string()]
}

fn default_log_tag() -> String {
    DEFAULT_LOG_TAG.to_string()
}

impl Default for LauncherSection {
    fn default() -> Self {
        Self {
            asset_dir: default_asset_dir(),
            files_dir: default_files_dir(),
            asset_name: default_asset_name(),
            args: default_args(),
            log_tag: default_log_tag(),
            permission_policy: PermissionPolicy::default(),
            output: OutputMode::default(),
            run_timeout: None,
        }
    }
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub launcher: LauncherSection,
    /// `launcher.run_timeout`, parsed.
    pub run_timeout: Option<Duration>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(launcher: LauncherSection, run_timeout: Option<Duration>) -> Self {
        Self {
            launcher,
            run_timeout,
        }
    }

    /// Make relative `asset_dir` / `files_dir` relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.launcher.asset_dir.is_relative() {
            self.launcher.asset_dir = base.join(&self.launcher.asset_dir);
        }
        if self.launcher.files_dir.is_relative() {
            self.launcher.files_dir = base.join(&self.launcher.files_dir);
        }
    }

    pub fn launch_settings(&self) -> LaunchSettings {
        LaunchSettings {
            asset_name: self.launcher.asset_name.clone(),
            args: self.launcher.args.clone(),
            permission_policy: self.launcher.permission_policy,
            supervise: SuperviseOptions {
                tag: self.launcher.log_tag.clone(),
                run_timeout: self.run_timeout,
            },
        }
    }
}
