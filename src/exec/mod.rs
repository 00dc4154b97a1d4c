// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`merged`] spawns the payload with stderr and stdout sharing one pipe.
//! - [`supervise`] runs the read-and-forward loop until end-of-data,
//!   cancellation or timeout.

use std::time::Duration;

pub mod merged;
pub mod supervise;

pub use merged::{MergedChild, spawn_merged};
pub use supervise::{spawn_and_supervise, spawn_and_supervise_with, supervise};

/// Knobs for the supervise loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperviseOptions {
    /// Prefix written in front of every relayed line.
    pub tag: String,
    /// Kill the payload after this long. `None` means wait forever.
    pub run_timeout: Option<Duration>,
}

impl Default for SuperviseOptions {
    fn default() -> Self {
        Self {
            tag: crate::engine::DEFAULT_LOG_TAG.to_string(),
            run_timeout: None,
        }
    }
}

/// How a supervised run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// Output reached end-of-data and the process exited with this code
    /// (`None` when it was killed by a signal).
    Exited(Option<i32>),
    /// An explicit cancel arrived; the process was killed.
    Cancelled,
    /// The run timeout elapsed; the process was killed.
    TimedOut,
}

/// Result of a supervised run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperviseOutcome {
    pub lines_forwarded: u64,
    pub end: RunEnd,
}
