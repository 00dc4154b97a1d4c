// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `collector-launcher`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "collector-launcher",
    version,
    about = "Materialize the bundled collector payload, run it and relay its output.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a config file (TOML).
    ///
    /// Without it every setting takes its default, with directories relative
    /// to the current working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override `[launcher].asset_dir`.
    #[arg(long, value_name = "DIR")]
    pub asset_dir: Option<PathBuf>,

    /// Override `[launcher].files_dir`.
    #[arg(long, value_name = "DIR")]
    pub files_dir: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `COLLECTOR_LAUNCHER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the launch plan without copying or running anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
