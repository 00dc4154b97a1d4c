// src/engine/launcher.rs

use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::engine::handle::LaunchHandle;
use crate::engine::state::LaunchState;
use crate::engine::{DEFAULT_ASSET_NAME, DEFAULT_TARGET_ADDRESS, LaunchReport};
use crate::errors::{Result, render_chain};
use crate::exec::{RunEnd, SuperviseOptions, SuperviseOutcome, spawn_and_supervise_with};
use crate::host::{AssetSource, FileStore};
use crate::payload::{PermissionPolicy, grant_executable, materialize_payload};
use crate::sink::LogSink;

/// Everything a launch needs besides the host services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSettings {
    pub asset_name: String,
    pub args: Vec<String>,
    pub permission_policy: PermissionPolicy,
    pub supervise: SuperviseOptions,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            asset_name: DEFAULT_ASSET_NAME.to_string(),
            args: vec![DEFAULT_TARGET_ADDRESS.to_string()],
            permission_policy: PermissionPolicy::default(),
            supervise: SuperviseOptions::default(),
        }
    }
}

/// One-shot launcher for the bundled payload.
pub struct Launcher {
    settings: LaunchSettings,
    assets: Arc<dyn AssetSource>,
    store: Arc<dyn FileStore>,
    sink: Arc<dyn LogSink>,
    state_tx: watch::Sender<LaunchState>,
}

impl Launcher {
    pub fn new(
        settings: LaunchSettings,
        assets: Arc<dyn AssetSource>,
        store: Arc<dyn FileStore>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        let (state_tx, _) = watch::channel(LaunchState::NotStarted);
        Self {
            settings,
            assets,
            store,
            sink,
            state_tx,
        }
    }

    pub fn settings(&self) -> &LaunchSettings {
        &self.settings
    }

    /// Subscribe to state changes.
    pub fn state(&self) -> watch::Receiver<LaunchState> {
        self.state_tx.subscribe()
    }

    /// Run the launch on a background task.
    ///
    /// The caller is never blocked. A failed launch is logged here with its
    /// full error chain and also returned through [`LaunchHandle::join`].
    /// Dropping the handle leaves the launch running.
    pub fn spawn(self) -> LaunchHandle {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let state_rx = self.state();

        let handle = tokio::spawn(async move {
            let result = self.run(cancel_rx).await;
            match &result {
                Ok(report) => info!(
                    asset = %self.settings.asset_name,
                    end = ?report.outcome.end,
                    lines = report.outcome.lines_forwarded,
                    "launch finished"
                ),
                Err(err) => error!(
                    asset = %self.settings.asset_name,
                    "launch failed: {}",
                    render_chain(err)
                ),
            }
            result
        });

        LaunchHandle::new(cancel_tx, state_rx, handle)
    }

    /// Run the launch on the current task and wait for it to finish.
    pub async fn run(&self, cancel_rx: oneshot::Receiver<()>) -> Result<LaunchReport> {
        let result = self.run_inner(cancel_rx).await;
        if result.is_err() {
            self.advance(LaunchState::Failed);
        }
        result
    }

    async fn run_inner(&self, mut cancel_rx: oneshot::Receiver<()>) -> Result<LaunchReport> {
        self.advance(LaunchState::Copying);

        let assets = Arc::clone(&self.assets);
        let store = Arc::clone(&self.store);
        let asset_name = self.settings.asset_name.clone();
        let materialized = tokio::task::spawn_blocking(move || {
            materialize_payload(assets.as_ref(), store.as_ref(), &asset_name)
        })
        .await??;

        let executable_granted = grant_executable(self.store.as_ref(), &materialized.path);
        self.settings
            .permission_policy
            .check(executable_granted, &materialized.path)?;
        self.advance(LaunchState::Copied);

        // A cancel sent while copying wins over the spawn.
        if cancel_rx.try_recv().is_ok() {
            info!(path = ?materialized.path, "cancellation requested before spawn; not starting payload");
            self.advance(LaunchState::Terminated);
            return Ok(LaunchReport {
                payload_path: materialized.path,
                bytes_copied: materialized.bytes,
                executable_granted,
                outcome: SuperviseOutcome {
                    lines_forwarded: 0,
                    end: RunEnd::Cancelled,
                },
            });
        }

        self.advance(LaunchState::Spawning);
        let outcome = spawn_and_supervise_with(
            &materialized.path,
            &self.settings.args,
            self.sink.as_ref(),
            &self.settings.supervise,
            cancel_rx,
            || self.advance(LaunchState::Running),
        )
        .await?;
        self.advance(LaunchState::Terminated);

        Ok(LaunchReport {
            payload_path: materialized.path,
            bytes_copied: materialized.bytes,
            executable_granted,
            outcome,
        })
    }

    fn advance(&self, next: LaunchState) {
        self.state_tx.send_modify(|state| match state.transition(next) {
            Some(new_state) => {
                debug!(from = %state, to = %new_state, "launch state");
                *state = new_state;
            }
            None => warn!(from = %state, to = %next, "ignoring invalid launch state transition"),
        });
    }
}
