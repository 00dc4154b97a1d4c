// src/engine/state.rs

use std::fmt;

/// Where a launch currently is.
///
/// ```text
/// NotStarted -> Copying -> Copied -> Spawning -> Running -> Terminated
/// Copied -> Terminated                      (cancelled before spawn)
/// Copying | Spawning | Running -> Failed
/// ```
///
/// `Copying` covers both the copy and the execute-permission grant.
/// `Terminated` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchState {
    #[default]
    NotStarted,
    Copying,
    Copied,
    Spawning,
    Running,
    Terminated,
    Failed,
}

impl LaunchState {
    /// The state after moving to `next`, or `None` if that move is not
    /// allowed from here.
    pub fn transition(self, next: LaunchState) -> Option<LaunchState> {
        use LaunchState::*;

        let allowed = matches!(
            (self, next),
            (NotStarted, Copying)
                | (Copying, Copied)
                | (Copied, Spawning)
                | (Spawning, Running)
                | (Running, Terminated)
                | (Copied, Terminated)
                | (Copying, Failed)
                | (Spawning, Failed)
                | (Running, Failed)
        );

        allowed.then_some(next)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LaunchState::Terminated | LaunchState::Failed)
    }
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LaunchState::NotStarted => "not-started",
            LaunchState::Copying => "copying",
            LaunchState::Copied => "copied",
            LaunchState::Spawning => "spawning",
            LaunchState::Running => "running",
            LaunchState::Terminated => "terminated",
            LaunchState::Failed => "failed",
        };
        f.write_str(s)
    }
}
