// tests/materialize_copy.rs
mod common;
use crate::common::fakes::{TrackedAssetSource, TrackingStore, UncreatableStore};
use crate::common::init_tracing;

use std::error::Error;
use std::io::{self, Cursor, Read};

use proptest::prelude::*;
use tempfile::tempdir;

use collector_launcher::errors::LauncherError;
use collector_launcher::host::{DirAssetSource, DirFileStore, FileStore, MemoryAssetSource};
use collector_launcher::payload::{CHUNK_SIZE, copy_chunked, materialize_payload};

type TestResult = Result<(), Box<dyn Error>>;

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

#[test]
fn copies_sizes_around_the_chunk_boundary() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let store = DirFileStore::new(dir.path());

    for len in [0, 1, CHUNK_SIZE - 1, CHUNK_SIZE, CHUNK_SIZE + 1, 3 * CHUNK_SIZE + 17] {
        let content = pattern(len);
        let assets = MemoryAssetSource::new().with_asset("payload", content.clone());

        let out = materialize_payload(&assets, &store, "payload")?;

        assert_eq!(out.path, dir.path().join("payload"));
        assert_eq!(out.bytes, len as u64);
        assert_eq!(std::fs::read(&out.path)?, content, "size {len}");
    }

    Ok(())
}

#[test]
fn overwrites_a_longer_previous_copy() -> TestResult {
    let dir = tempdir()?;
    let store = DirFileStore::new(dir.path());
    std::fs::write(dir.path().join("payload"), vec![b'x'; 10_000])?;

    let assets = MemoryAssetSource::new().with_asset("payload", b"short".to_vec());
    materialize_payload(&assets, &store, "payload")?;

    assert_eq!(std::fs::read(dir.path().join("payload"))?, b"short");
    Ok(())
}

#[test]
fn creates_missing_writable_dir() -> TestResult {
    let dir = tempdir()?;
    let store = DirFileStore::new(dir.path().join("files").join("nested"));
    let assets = MemoryAssetSource::new().with_asset("payload", b"abc".to_vec());

    let out = materialize_payload(&assets, &store, "payload")?;
    assert_eq!(std::fs::read(out.path)?, b"abc");
    Ok(())
}

#[test]
fn reads_assets_from_a_directory() -> TestResult {
    let assets_dir = tempdir()?;
    let files_dir = tempdir()?;
    std::fs::write(assets_dir.path().join("payload"), pattern(9000))?;

    let assets = DirAssetSource::new(assets_dir.path());
    let store = DirFileStore::new(files_dir.path());
    let out = materialize_payload(&assets, &store, "payload")?;

    assert_eq!(std::fs::read(out.path)?, pattern(9000));
    Ok(())
}

#[test]
fn missing_asset_is_a_materialize_error() -> TestResult {
    let dir = tempdir()?;
    let store = DirFileStore::new(dir.path());
    let assets = MemoryAssetSource::new();

    match materialize_payload(&assets, &store, "payload") {
        Err(LauncherError::Materialize { asset, source, .. }) => {
            assert_eq!(asset, "payload");
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
        }
        other => panic!("expected Materialize error, got {other:?}"),
    }
    assert!(!dir.path().join("payload").exists(), "nothing created when the source is missing");
    Ok(())
}

#[test]
fn uncreatable_destination_is_a_materialize_error() {
    let assets = MemoryAssetSource::new().with_asset("payload", b"abc".to_vec());

    match materialize_payload(&assets, &UncreatableStore, "payload") {
        Err(LauncherError::Materialize { source, .. }) => {
            assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        }
        other => panic!("expected Materialize error, got {other:?}"),
    }
}

#[test]
fn both_handles_released_after_success() -> TestResult {
    let assets = TrackedAssetSource::new(pattern(10_000));
    let store = TrackingStore::new();

    materialize_payload(&assets, &store, "payload")?;

    assert!(assets.released.is_released(), "source handle still open");
    assert!(store.released.is_released(), "destination handle still open");
    assert_eq!(store.written(), pattern(10_000));
    Ok(())
}

#[test]
fn both_handles_released_after_mid_stream_failure() {
    let assets = TrackedAssetSource::new(pattern(10_000)).failing_after(CHUNK_SIZE + 100);
    let store = TrackingStore::new();

    let result = materialize_payload(&assets, &store, "payload");

    assert!(matches!(result, Err(LauncherError::Materialize { .. })));
    assert!(assets.released.is_released(), "source handle still open");
    assert!(store.released.is_released(), "destination handle still open");
    // No cleanup: whatever was copied before the failure stays.
    assert_eq!(store.written(), pattern(CHUNK_SIZE + 100));
}

/// Reader that hands out at most `step` bytes per call and reports
/// `Interrupted` every other call.
struct Choppy {
    inner: Cursor<Vec<u8>>,
    step: usize,
    interrupt_next: bool,
}

impl Read for Choppy {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt_next = !self.interrupt_next;
        if self.interrupt_next {
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        let n = self.step.min(buf.len());
        self.inner.read(&mut buf[..n])
    }
}

#[test]
fn copy_retries_interrupted_reads_and_short_reads() -> TestResult {
    let content = pattern(5000);
    let mut reader = Choppy {
        inner: Cursor::new(content.clone()),
        step: 700,
        interrupt_next: false,
    };
    let mut out = Vec::new();

    let n = copy_chunked(&mut reader, &mut out)?;

    assert_eq!(n, 5000);
    assert_eq!(out, content);
    Ok(())
}

#[test]
fn payload_path_is_inside_writable_dir() {
    let store = DirFileStore::new("/data/app/files");
    assert_eq!(
        store.payload_path("b_collector_monitor"),
        std::path::PathBuf::from("/data/app/files/b_collector_monitor")
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn copy_is_byte_exact(content in proptest::collection::vec(any::<u8>(), 0..(4 * CHUNK_SIZE + 3))) {
        let assets = MemoryAssetSource::new().with_asset("payload", content.clone());
        let store = TrackingStore::new();

        let out = materialize_payload(&assets, &store, "payload").unwrap();

        prop_assert_eq!(out.bytes, content.len() as u64);
        prop_assert_eq!(store.written(), content);
    }
}
