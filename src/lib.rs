// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod host;
pub mod logging;
pub mod payload;
pub mod sink;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, OutputMode, default_config, load_and_validate};
use crate::engine::Launcher;
use crate::host::{DirAssetSource, DirFileStore};
use crate::sink::{LogSink, StdoutSink, TracingSink};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - host services and the output sink
/// - the background launch
/// - Ctrl-C handling (cancels the launch and kills the payload)
///
/// A failed launch is logged by the launch task and does not make this
/// function fail; only problems with the host side (config) do.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let assets = Arc::new(DirAssetSource::new(&cfg.launcher.asset_dir));
    let store = Arc::new(DirFileStore::new(&cfg.launcher.files_dir));
    let sink: Arc<dyn LogSink> = match cfg.launcher.output {
        OutputMode::Stdout => Arc::new(StdoutSink),
        OutputMode::Log => Arc::new(TracingSink),
    };

    let launcher = Launcher::new(cfg.launch_settings(), assets, store, sink);
    let mut handle = launcher.spawn();
    info!(asset = %cfg.launcher.asset_name, "launch started in background");

    let finished = tokio::select! {
        result = handle.wait() => Some(result),
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                eprintln!("failed to listen for Ctrl+C: {e}");
            }
            None
        }
    };

    let result = match finished {
        Some(result) => result,
        None => {
            info!("interrupted; cancelling launch");
            handle.cancel();
            handle.wait().await
        }
    };

    debug!(ok = result.is_ok(), state = %handle.state(), "launch task done");
    Ok(())
}

fn resolve_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut cfg = match &args.config {
        Some(path) => load_and_validate(path)?,
        None => default_config()?,
    };

    if let Some(dir) = &args.asset_dir {
        cfg.launcher.asset_dir = dir.clone();
    }
    if let Some(dir) = &args.files_dir {
        cfg.launcher.files_dir = dir.clone();
    }

    Ok(cfg)
}

/// Simple dry-run output: print what would be copied and run.
fn print_dry_run(cfg: &ConfigFile) {
    let l = &cfg.launcher;
    println!("collector-launcher dry-run");
    println!("  asset: {}", l.asset_dir.join(&l.asset_name).display());
    println!("  payload: {}", l.files_dir.join(&l.asset_name).display());
    println!("  args: {:?}", l.args);
    println!("  log_tag: {}", l.log_tag);
    println!("  permission_policy: {:?}", l.permission_policy);
    println!("  output: {:?}", l.output);
    match cfg.run_timeout {
        Some(t) => println!("  run_timeout: {:?}", t),
        None => println!("  run_timeout: none"),
    }

    debug!("dry-run complete (nothing copied or executed)");
}
