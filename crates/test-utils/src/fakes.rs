#![allow(dead_code)]

use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use collector_launcher::host::{AssetSource, DirFileStore, FileStore};

/// Shared "this handle was dropped" flag.
#[derive(Debug, Clone, Default)]
pub struct Released(Arc<AtomicBool>);

impl Released {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_released(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn mark(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Reader that flags its release on drop and can fail after a number of
/// bytes.
pub struct TrackedReader {
    inner: Cursor<Vec<u8>>,
    fail_after: Option<usize>,
    served: usize,
    released: Released,
}

impl Read for TrackedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(limit) = self.fail_after {
            if self.served >= limit {
                return Err(io::Error::other("simulated read failure"));
            }
            let room = (limit - self.served).min(buf.len());
            let n = self.inner.read(&mut buf[..room])?;
            self.served += n;
            return Ok(n);
        }
        let n = self.inner.read(buf)?;
        self.served += n;
        Ok(n)
    }
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.released.mark();
    }
}

/// Asset source serving one blob through a [`TrackedReader`].
#[derive(Debug, Clone)]
pub struct TrackedAssetSource {
    content: Vec<u8>,
    fail_after: Option<usize>,
    pub released: Released,
}

impl TrackedAssetSource {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            fail_after: None,
            released: Released::new(),
        }
    }

    /// Fail the read once `n` bytes have been served.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

impl AssetSource for TrackedAssetSource {
    fn open(&self, _name: &str) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(TrackedReader {
            inner: Cursor::new(self.content.clone()),
            fail_after: self.fail_after,
            served: 0,
            released: self.released.clone(),
        }))
    }
}

/// Writer that collects bytes in memory and flags its release on drop.
pub struct TrackedWriter {
    written: Arc<Mutex<Vec<u8>>>,
    released: Released,
}

impl Write for TrackedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for TrackedWriter {
    fn drop(&mut self) {
        self.released.mark();
    }
}

/// File store that never touches disk; `create` hands out a
/// [`TrackedWriter`].
#[derive(Debug, Clone)]
pub struct TrackingStore {
    dir: PathBuf,
    pub written: Arc<Mutex<Vec<u8>>>,
    pub released: Released,
}

impl TrackingStore {
    pub fn new() -> Self {
        Self {
            dir: PathBuf::from("/tracking-store"),
            written: Arc::new(Mutex::new(Vec::new())),
            released: Released::new(),
        }
    }

    pub fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }
}

impl Default for TrackingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore for TrackingStore {
    fn writable_dir(&self) -> PathBuf {
        self.dir.clone()
    }

    fn create(&self, _path: &Path) -> io::Result<Box<dyn Write + Send>> {
        Ok(Box::new(TrackedWriter {
            written: Arc::clone(&self.written),
            released: self.released.clone(),
        }))
    }

    fn grant_executable(&self, _path: &Path) -> bool {
        true
    }
}

/// Real directory store whose execute-permission grant always fails, as on a
/// filesystem mounted read-only or `noexec`.
#[derive(Debug, Clone)]
pub struct NoExecStore {
    inner: DirFileStore,
    pub grant_attempts: Arc<AtomicUsize>,
}

impl NoExecStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: DirFileStore::new(dir),
            grant_attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn attempts(&self) -> usize {
        self.grant_attempts.load(Ordering::SeqCst)
    }
}

impl FileStore for NoExecStore {
    fn writable_dir(&self) -> PathBuf {
        self.inner.writable_dir()
    }

    fn grant_executable(&self, _path: &Path) -> bool {
        self.grant_attempts.fetch_add(1, Ordering::SeqCst);
        false
    }
}

/// Store whose destination can never be created.
#[derive(Debug, Clone, Default)]
pub struct UncreatableStore;

impl FileStore for UncreatableStore {
    fn writable_dir(&self) -> PathBuf {
        PathBuf::from("/uncreatable")
    }

    fn create(&self, _path: &Path) -> io::Result<Box<dyn Write + Send>> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "destination is read-only",
        ))
    }
}

/// Payload output that yields `prefix` and then fails every later read, like
/// a pipe torn down under the reader.
pub struct FailingOutput {
    prefix: Cursor<Vec<u8>>,
}

impl FailingOutput {
    pub fn new(prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix: Cursor::new(prefix.into()),
        }
    }
}

impl AsyncRead for FailingOutput {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut chunk = vec![0u8; buf.remaining()];
        let n = self.prefix.read(&mut chunk)?;
        if n == 0 {
            return Poll::Ready(Err(io::Error::other("output pipe broke")));
        }
        buf.put_slice(&chunk[..n]);
        Poll::Ready(Ok(()))
    }
}
