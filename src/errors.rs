// src/errors.rs

//! Crate-wide error type and helpers.
//!
//! Each launch step fails with its own variant so callers can tell a broken
//! copy from a failed spawn or a pipe that broke mid-read.

use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Copying the payload out of the asset store failed.
    #[error("failed to materialize asset '{asset}' to {path:?}")]
    Materialize {
        asset: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The payload could not be marked executable and the permission policy
    /// is `abort`.
    #[error("payload {0:?} could not be marked executable")]
    Permission(PathBuf),

    /// The payload process could not be started.
    #[error("failed to spawn {path:?}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading the merged output pipe failed while the payload was running.
    #[error("failed reading output of {path:?}")]
    StreamRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("launch task aborted: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LauncherError>;

/// Render an error and all of its sources, one per line.
///
/// This is what ends up in the log when a background launch fails.
pub fn render_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        out.push_str("\n  caused by: ");
        out.push_str(&source.to_string());
        current = source.source();
    }
    out
}
