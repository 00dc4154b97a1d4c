// src/exec/supervise.rs

//! The read-and-forward loop.

use std::borrow::Cow;
use std::path::Path;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::errors::{LauncherError, Result};
use crate::exec::merged::{MergedChild, spawn_merged};
use crate::exec::{RunEnd, SuperviseOptions, SuperviseOutcome};
use crate::sink::LogSink;

/// Spawn the payload and relay its merged output to `sink` until it stops.
///
/// A spawn failure is returned as [`LauncherError::Spawn`] before anything is
/// forwarded.
pub async fn spawn_and_supervise(
    executable: &Path,
    args: &[String],
    sink: &dyn LogSink,
    options: &SuperviseOptions,
    cancel_rx: oneshot::Receiver<()>,
) -> Result<SuperviseOutcome> {
    spawn_and_supervise_with(executable, args, sink, options, cancel_rx, || ()).await
}

/// Like [`spawn_and_supervise`], calling `on_started` once the process is
/// running and before the first line is read.
pub async fn spawn_and_supervise_with<F>(
    executable: &Path,
    args: &[String],
    sink: &dyn LogSink,
    options: &SuperviseOptions,
    cancel_rx: oneshot::Receiver<()>,
    on_started: F,
) -> Result<SuperviseOutcome>
where
    F: FnOnce(),
{
    let merged = spawn_merged(executable, args)
        .await
        .map_err(|source| LauncherError::Spawn {
            path: executable.to_path_buf(),
            source,
        })?;

    info!(
        path = ?executable,
        pid = merged.child.id(),
        args = ?args,
        "payload process started"
    );
    on_started();

    supervise(executable, merged, sink, options, cancel_rx).await
}

/// Relay output of an already running payload.
///
/// Stops when:
/// - the output reaches end-of-data (then waits for the exit status),
/// - `cancel_rx` receives a value (the child is killed),
/// - `options.run_timeout` elapses (the child is killed).
///
/// Dropping the cancel sender without sending does not stop the loop.
pub async fn supervise(
    executable: &Path,
    merged: MergedChild,
    sink: &dyn LogSink,
    options: &SuperviseOptions,
    mut cancel_rx: oneshot::Receiver<()>,
) -> Result<SuperviseOutcome> {
    let MergedChild { mut child, output } = merged;

    // A timeout too large to represent as an instant never fires.
    let deadline = options
        .run_timeout
        .and_then(|d| Instant::now().checked_add(d));
    let timeout = async move {
        match deadline {
            Some(at) => sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(timeout);

    let mut reader = BufReader::new(output);
    let mut buf: Vec<u8> = Vec::new();
    let mut lines_forwarded: u64 = 0;
    let mut cancel_open = true;

    // Partial reads stay in `buf` when another branch wins, so the buffer is
    // only cleared after a full line has been forwarded.
    loop {
        tokio::select! {
            biased;

            cancel = &mut cancel_rx, if cancel_open => {
                if cancel.is_ok() {
                    info!(path = ?executable, "cancellation requested; killing payload");
                    kill(&mut child, executable).await;
                    return Ok(SuperviseOutcome { lines_forwarded, end: RunEnd::Cancelled });
                }
                debug!(path = ?executable, "cancel channel closed; supervising until end-of-data");
                cancel_open = false;
            }

            _ = &mut timeout => {
                warn!(path = ?executable, "run timeout elapsed; killing payload");
                kill(&mut child, executable).await;
                return Ok(SuperviseOutcome { lines_forwarded, end: RunEnd::TimedOut });
            }

            read = reader.read_until(b'\n', &mut buf) => {
                let n = read.map_err(|source| LauncherError::StreamRead {
                    path: executable.to_path_buf(),
                    source,
                })?;
                if n == 0 && buf.is_empty() {
                    break;
                }
                sink.forward(&options.tag, &decode_line(&buf));
                lines_forwarded += 1;
                buf.clear();
                if n == 0 {
                    break;
                }
            }
        }
    }

    debug!(path = ?executable, lines_forwarded, "payload output reached end-of-data");

    // Output is closed but the process may linger; keep honouring cancel and
    // timeout while waiting for it.
    let status = loop {
        tokio::select! {
            biased;

            cancel = &mut cancel_rx, if cancel_open => {
                if cancel.is_ok() {
                    info!(path = ?executable, "cancellation requested; killing payload");
                    kill(&mut child, executable).await;
                    return Ok(SuperviseOutcome { lines_forwarded, end: RunEnd::Cancelled });
                }
                cancel_open = false;
            }

            _ = &mut timeout => {
                warn!(path = ?executable, "run timeout elapsed; killing payload");
                kill(&mut child, executable).await;
                return Ok(SuperviseOutcome { lines_forwarded, end: RunEnd::TimedOut });
            }

            status = child.wait() => {
                break status.map_err(|source| LauncherError::StreamRead {
                    path: executable.to_path_buf(),
                    source,
                })?;
            }
        }
    };

    info!(
        path = ?executable,
        exit_code = ?status.code(),
        success = status.success(),
        lines_forwarded,
        "payload process exited"
    );

    Ok(SuperviseOutcome {
        lines_forwarded,
        end: RunEnd::Exited(status.code()),
    })
}

/// Turn one raw line into text: drop the `\n` / `\r\n` terminator and replace
/// invalid UTF-8 instead of failing the whole stream.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && raw[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&raw[..end])
}

async fn kill(child: &mut Child, executable: &Path) {
    if let Err(e) = child.kill().await {
        warn!(path = ?executable, error = %e, "failed to kill payload process");
    }
}
