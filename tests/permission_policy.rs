// tests/permission_policy.rs
mod common;
use crate::common::fakes::NoExecStore;

use std::error::Error;
use std::path::Path;
use std::str::FromStr;

use tempfile::tempdir;

use collector_launcher::errors::LauncherError;
use collector_launcher::host::DirFileStore;
use collector_launcher::payload::{PermissionPolicy, grant_executable};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn default_policy_is_ignore() {
    assert_eq!(PermissionPolicy::default(), PermissionPolicy::Ignore);
}

#[test]
fn granted_always_passes() {
    let path = Path::new("/files/payload");
    for policy in [PermissionPolicy::Ignore, PermissionPolicy::Warn, PermissionPolicy::Abort] {
        assert!(policy.check(true, path).is_ok(), "{policy:?}");
    }
}

#[test]
fn only_abort_turns_a_failed_grant_into_an_error() {
    let path = Path::new("/files/payload");
    assert!(PermissionPolicy::Ignore.check(false, path).is_ok());
    assert!(PermissionPolicy::Warn.check(false, path).is_ok());
    assert!(matches!(
        PermissionPolicy::Abort.check(false, path),
        Err(LauncherError::Permission(p)) if p == path
    ));
}

#[test]
fn parses_from_str() {
    assert_eq!(PermissionPolicy::from_str("ignore"), Ok(PermissionPolicy::Ignore));
    assert_eq!(PermissionPolicy::from_str(" WARN "), Ok(PermissionPolicy::Warn));
    assert_eq!(PermissionPolicy::from_str("abort"), Ok(PermissionPolicy::Abort));
    assert!(PermissionPolicy::from_str("retry").is_err());
}

#[cfg(unix)]
#[test]
fn grant_sets_owner_execute_and_keeps_other_bits() -> TestResult {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir()?;
    let path = dir.path().join("payload");
    std::fs::write(&path, b"x")?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640))?;

    assert!(grant_executable(&DirFileStore::new(dir.path()), &path));

    let mode = std::fs::metadata(&path)?.permissions().mode() & 0o777;
    assert_eq!(mode, 0o740);
    Ok(())
}

#[test]
fn grant_on_missing_file_reports_failure() -> TestResult {
    let dir = tempdir()?;
    let store = DirFileStore::new(dir.path());
    assert!(!grant_executable(&store, &dir.path().join("missing")));
    Ok(())
}

#[test]
fn grant_goes_through_the_store() -> TestResult {
    let dir = tempdir()?;
    let store = NoExecStore::new(dir.path());
    assert!(!grant_executable(&store, &dir.path().join("payload")));
    assert_eq!(store.attempts(), 1);
    Ok(())
}
