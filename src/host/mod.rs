// src/host/mod.rs

//! Host services the launcher depends on.
//!
//! The launcher never touches a concrete asset bundle or sandbox directory
//! directly; it goes through these two traits so tests can swap in in-memory
//! or deliberately broken implementations.

use std::fmt::Debug;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

pub mod memory;

pub use memory::MemoryAssetSource;

/// Read-only store of named blobs (the application's bundled assets).
pub trait AssetSource: Send + Sync + Debug {
    /// Open the asset called `name` for reading.
    ///
    /// A missing asset is reported as `io::ErrorKind::NotFound`.
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// Private, writable location where the payload is materialized.
pub trait FileStore: Send + Sync + Debug {
    fn writable_dir(&self) -> PathBuf;

    /// Where an asset called `name` is copied to.
    fn payload_path(&self, name: &str) -> PathBuf {
        self.writable_dir().join(name)
    }

    /// Create (or truncate) `path` for writing.
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write + Send>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        Ok(Box::new(file))
    }

    /// Mark `path` executable for the current user. Returns whether that
    /// worked; callers decide what a `false` means.
    fn grant_executable(&self, path: &Path) -> bool {
        set_owner_executable(path).is_ok()
    }
}

/// Assets stored as plain files under a root directory.
#[derive(Debug, Clone)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirAssetSource {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>> {
        let file = fs::File::open(self.root.join(name))?;
        Ok(Box::new(file))
    }
}

/// A writable directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirFileStore {
    dir: PathBuf,
}

impl DirFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileStore for DirFileStore {
    fn writable_dir(&self) -> PathBuf {
        self.dir.clone()
    }
}

/// Add the owner execute bit, keeping every other mode bit as it is.
#[cfg(unix)]
pub fn set_owner_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o100);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
pub fn set_owner_executable(_path: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "execute permission bits are only supported on unix",
    ))
}
