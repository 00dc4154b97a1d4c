// src/engine/handle.rs

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::engine::LaunchReport;
use crate::engine::state::LaunchState;
use crate::errors::Result;

/// Handle to a launch running on a background task.
///
/// - `cancel` asks the supervise loop to kill the payload and stop reading.
/// - `wait` / `join` resolve to the launch result.
/// - `state` / `subscribe` observe progress.
pub struct LaunchHandle {
    cancel: Option<oneshot::Sender<()>>,
    state: watch::Receiver<LaunchState>,
    handle: JoinHandle<Result<LaunchReport>>,
}

impl LaunchHandle {
    pub(crate) fn new(
        cancel: oneshot::Sender<()>,
        state: watch::Receiver<LaunchState>,
        handle: JoinHandle<Result<LaunchReport>>,
    ) -> Self {
        Self {
            cancel: Some(cancel),
            state,
            handle,
        }
    }

    /// Request cancellation. Returns `false` if a cancel was already sent or
    /// the supervise loop is no longer listening.
    pub fn cancel(&mut self) -> bool {
        match self.cancel.take() {
            Some(tx) => {
                let delivered = tx.send(()).is_ok();
                if !delivered {
                    debug!("launch already finished while cancelling");
                }
                delivered
            }
            None => false,
        }
    }

    /// Current launch state.
    pub fn state(&self) -> LaunchState {
        *self.state.borrow()
    }

    /// A receiver that sees every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<LaunchState> {
        self.state.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the launch to finish without giving up the handle, so it can
    /// still be cancelled if this future is dropped first (e.g. inside
    /// `tokio::select!`). Must not be awaited again once it has resolved.
    pub async fn wait(&mut self) -> Result<LaunchReport> {
        (&mut self.handle).await?
    }

    /// Wait for the launch to finish.
    pub async fn join(self) -> Result<LaunchReport> {
        self.handle.await?
    }
}
