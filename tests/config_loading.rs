// tests/config_loading.rs
mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::NamedTempFile;

use collector_launcher::config::{
    ConfigFile, OutputMode, RawConfigFile, default_config, load_and_validate, parse_duration,
};
use collector_launcher::errors::LauncherError;
use collector_launcher::payload::PermissionPolicy;

type TestResult = Result<(), Box<dyn Error>>;

fn config_from(toml_text: &str) -> Result<ConfigFile, LauncherError> {
    let raw: RawConfigFile = toml::from_str(toml_text)?;
    ConfigFile::try_from(raw)
}

#[test]
fn demo_config_is_parsed_and_resolved() -> TestResult {
    init_tracing();

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cfg = load_and_validate(manifest_dir.join("demos/launcher.toml"))?;

    assert_eq!(cfg.launcher.asset_dir, manifest_dir.join("demos/assets"));
    assert_eq!(cfg.launcher.files_dir, manifest_dir.join("demos/files"));
    assert_eq!(cfg.launcher.asset_name, "b_collector_monitor");
    assert_eq!(cfg.launcher.args, vec!["192.168.1.50".to_string()]);
    assert_eq!(cfg.launcher.permission_policy, PermissionPolicy::Warn);
    assert_eq!(cfg.launcher.output, OutputMode::Log);
    assert_eq!(cfg.run_timeout, Some(Duration::from_secs(600)));

    let settings = cfg.launch_settings();
    assert_eq!(settings.supervise.tag, "[B_MONITOR]");
    assert_eq!(settings.supervise.run_timeout, Some(Duration::from_secs(600)));
    Ok(())
}

#[test]
fn defaults_match_the_fixed_launch_contract() -> TestResult {
    let cfg = default_config()?;

    assert_eq!(cfg.launcher.asset_dir, PathBuf::from("assets"));
    assert_eq!(cfg.launcher.files_dir, PathBuf::from("files"));
    assert_eq!(cfg.launcher.asset_name, "b_collector_monitor");
    assert_eq!(cfg.launcher.args, vec!["192.168.1.50".to_string()]);
    assert_eq!(cfg.launcher.log_tag, "[B_MONITOR]");
    assert_eq!(cfg.launcher.permission_policy, PermissionPolicy::Ignore);
    assert_eq!(cfg.launcher.output, OutputMode::Stdout);
    assert_eq!(cfg.run_timeout, None);

    assert_eq!(cfg.launch_settings(), collector_launcher::engine::LaunchSettings::default());
    Ok(())
}

#[test]
fn empty_file_and_empty_section_use_defaults() -> TestResult {
    let a = config_from("")?;
    let b = config_from("[launcher]\n")?;
    assert_eq!(a.launch_settings(), b.launch_settings());
    Ok(())
}

#[test]
fn absolute_dirs_are_not_rebased() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
[launcher]
asset_dir = "/opt/bundle"
files_dir = "private"
"#
    )?;

    let cfg = load_and_validate(file.path())?;
    let parent = file.path().parent().expect("temp file has a parent");

    assert_eq!(cfg.launcher.asset_dir, PathBuf::from("/opt/bundle"));
    assert_eq!(cfg.launcher.files_dir, parent.join("private"));
    Ok(())
}

#[test]
fn asset_name_must_be_a_plain_file_name() {
    for bad in ["", "  ", "../escape", "dir/payload", "/abs", ".", ".."] {
        let text = format!("[launcher]\nasset_name = {bad:?}\n");
        match config_from(&text) {
            Err(LauncherError::ConfigError(msg)) => {
                assert!(msg.contains("asset_name"), "{bad:?}: {msg}");
            }
            other => panic!("{bad:?}: expected ConfigError, got {other:?}"),
        }
    }
}

#[test]
fn empty_log_tag_is_rejected() {
    assert!(matches!(
        config_from("[launcher]\nlog_tag = \"\"\n"),
        Err(LauncherError::ConfigError(msg)) if msg.contains("log_tag")
    ));
}

#[test]
fn bad_run_timeout_is_rejected() {
    for bad in ["soon", "10", "5d", "0s"] {
        let text = format!("[launcher]\nrun_timeout = {bad:?}\n");
        assert!(
            matches!(config_from(&text), Err(LauncherError::ConfigError(ref msg)) if msg.contains("run_timeout")),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn oversized_run_timeout_is_rejected_not_a_panic() {
    for huge in ["400000000000000000m", "5124095576030432h"] {
        let text = format!("[launcher]\nrun_timeout = {huge:?}\n");
        assert!(
            matches!(config_from(&text), Err(LauncherError::ConfigError(ref msg)) if msg.contains("run_timeout")),
            "{huge:?} should be rejected"
        );
    }
}

#[test]
fn largest_second_count_is_accepted() -> TestResult {
    let cfg = config_from("[launcher]\nrun_timeout = \"18446744073709551615s\"\n")?;
    assert_eq!(cfg.run_timeout, Some(Duration::from_secs(u64::MAX)));
    Ok(())
}

#[test]
fn unknown_policy_and_keys_are_toml_errors() {
    assert!(matches!(
        config_from("[launcher]\npermission_policy = \"retry\"\n"),
        Err(LauncherError::TomlError(_))
    ));
    assert!(matches!(
        config_from("[launcher]\nasset = \"typo\"\n"),
        Err(LauncherError::TomlError(_))
    ));
}

#[test]
fn missing_config_file_is_an_io_error() {
    let result = load_and_validate("/definitely/not/here/launcher.toml");
    assert!(matches!(result, Err(LauncherError::IoError(_))));
}

#[test]
fn durations_parse_with_units() {
    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration("3s"), Ok(Duration::from_secs(3)));
    assert_eq!(parse_duration(" 2m "), Ok(Duration::from_secs(120)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    assert!(parse_duration("").is_err());
    assert!(parse_duration("ms").is_err());
    assert!(parse_duration("307445734561825861m").is_err());
}
