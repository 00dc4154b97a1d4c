// src/exec/merged.rs

//! Spawning a child whose stderr is folded into its stdout.

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tracing::debug;

/// A running payload and the read end of its merged output.
pub struct MergedChild {
    pub child: Child,
    pub output: Box<dyn AsyncRead + Send + Unpin>,
}

/// errno for "text file busy": the executable is still open for writing,
/// usually by a sibling process forked while we were copying it.
#[cfg(unix)]
const ETXTBSY: i32 = 26;

const SPAWN_ATTEMPTS: u32 = 5;

/// Spawn `executable` with `args`, stdout and stderr wired to one pipe.
///
/// The child is killed when its [`Child`] handle is dropped.
pub async fn spawn_merged(executable: &Path, args: &[String]) -> io::Result<MergedChild> {
    let mut attempt = 1;
    loop {
        match spawn_once(executable, args) {
            Err(e) if is_text_file_busy(&e) && attempt < SPAWN_ATTEMPTS => {
                debug!(path = ?executable, attempt, "executable busy; retrying spawn");
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(10 * attempt as u64)).await;
            }
            other => return other,
        }
    }
}

#[cfg(unix)]
fn spawn_once(executable: &Path, args: &[String]) -> io::Result<MergedChild> {
    use std::os::fd::OwnedFd;
    use tokio::net::unix::pipe;

    let (reader, writer) = std::io::pipe()?;
    let writer_err = writer.try_clone()?;

    // The command holds the parent's copies of the write end; it has to be
    // dropped right after spawn or the reader never sees end-of-data.
    let child = {
        let mut cmd = Command::new(executable);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(writer_err)
            .kill_on_drop(true);
        cmd.spawn()?
    };

    let output = pipe::Receiver::from_owned_fd(OwnedFd::from(reader))?;

    Ok(MergedChild {
        child,
        output: Box::new(output),
    })
}

// No shared pipe here: stdout is drained first, then stderr.
#[cfg(not(unix))]
fn spawn_once(executable: &Path, args: &[String]) -> io::Result<MergedChild> {
    use tokio::io::AsyncReadExt;

    let mut child = Command::new(executable)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("child stdout not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("child stderr not captured"))?;

    Ok(MergedChild {
        child,
        output: Box::new(stdout.chain(stderr)),
    })
}

#[cfg(unix)]
fn is_text_file_busy(err: &io::Error) -> bool {
    err.raw_os_error() == Some(ETXTBSY)
}

#[cfg(not(unix))]
fn is_text_file_busy(_err: &io::Error) -> bool {
    false
}
