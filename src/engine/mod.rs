// src/engine/mod.rs

//! Launch orchestration.
//!
//! The [`Launcher`] runs the fixed pipeline
//! `materialize -> grant executable -> spawn -> supervise` and publishes its
//! progress as a [`LaunchState`]. [`Launcher::spawn`] moves the whole pipeline
//! onto a background Tokio task and hands back a [`LaunchHandle`].

use std::path::PathBuf;

use crate::exec::SuperviseOutcome;

pub mod handle;
pub mod launcher;
pub mod state;

pub use handle::LaunchHandle;
pub use launcher::{LaunchSettings, Launcher};
pub use state::LaunchState;

/// Name of the bundled payload asset.
pub const DEFAULT_ASSET_NAME: &str = "b_collector_monitor";

/// Address handed to the payload as its only argument.
pub const DEFAULT_TARGET_ADDRESS: &str = "192.168.1.50";

/// Prefix for every relayed output line.
pub const DEFAULT_LOG_TAG: &str = "[B_MONITOR]";

/// Summary of a launch that made it all the way through supervision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub payload_path: PathBuf,
    pub bytes_copied: u64,
    /// Whether marking the payload executable succeeded.
    pub executable_granted: bool,
    pub outcome: SuperviseOutcome,
}
